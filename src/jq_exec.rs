//! Narrow the input document before inference: JSON Pointer or a jq filter.
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

use crate::error::{GenError, Result};

/// Run `filter_src` over `input`; every output as JSON text.
pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<String>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader.load(&arena, program).map_err(format_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let mut it = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    while let Some(item) = it.next() {
        let v = item.map_err(|e| GenError::Selection(format!("jq runtime error: {e:?}")))?;
        out.push(format!("{v}"));
    }
    Ok(out)
}

/// The single value `filter_src` yields for `input`.
pub fn select(filter_src: &str, input: &Value) -> Result<Value> {
    let outputs = run_jaq(filter_src, input)?;
    let [only] = outputs.as_slice() else {
        return Err(GenError::Selection(format!(
            "jq filter `{filter_src}` produced {} values, expected exactly one",
            outputs.len()
        )));
    };
    serde_json::from_str(only)
        .map_err(|e| GenError::Selection(format!("jq filter `{filter_src}` produced invalid JSON: {e}")))
}

/// Sub-document at a JSON Pointer (`/data/0/config`).
pub fn select_pointer(pointer: &str, input: &Value) -> Result<Value> {
    input
        .pointer(pointer)
        .cloned()
        .ok_or_else(|| GenError::Selection(format!("JSON pointer `{pointer}` matches nothing")))
}

fn format_parse_errors(errs: Vec<(load::File<&str, ()>, load::Error<&str>)>) -> GenError {
    let mut s = String::new();
    for (file, err) in errs {
        s.push_str(&format!("parse error: {err:?} in `{}`", file.code));
    }
    GenError::Selection(s)
}

fn format_undefined_errors(errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>) -> GenError {
    let mut s = String::new();
    for (file, list) in errs {
        for (name, undef) in list {
            s.push_str(&format!("undefined `{name}`: {undef:?} in `{}`", file.code));
        }
    }
    GenError::Selection(s)
}
