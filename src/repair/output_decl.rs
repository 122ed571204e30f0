//! Drops a local redeclaration of the entry function's output parameter.

use log::warn;

use super::scope::FunctionScopes;
use super::text::word_positions;
use super::types::{DEFAULT_OUTPUT_PARAM, RepairOptions, RepairReport};
use super::vocab::TypeNames;

/// Inside the entry function, turn `vec4 <out> = ...` into `<out> = ...`.
pub fn fix_output_redeclaration(
    lines: &[String],
    options: &RepairOptions,
    report: &mut RepairReport,
) -> Vec<String> {
    let types = TypeNames::collect(lines);
    let scopes = FunctionScopes::build(lines, &types, &options.entry_point);
    let Some(entry) = scopes.entry() else {
        warn!("entry function `{}` not found", options.entry_point);
        return lines.to_vec();
    };
    let param = entry.output_param.as_deref().unwrap_or(DEFAULT_OUTPUT_PARAM);

    let mut out = lines.to_vec();
    for line in &mut out[entry.body.clone()] {
        let spans = redeclaration_spans(line, param);
        for span in spans.into_iter().rev() {
            line.replace_range(span, "");
            report.output_redeclarations_fixed += 1;
        }
    }
    out
}

/// Ranges covering `vec4` plus the whitespace before `param =`, for each redeclaration.
fn redeclaration_spans(line: &str, param: &str) -> Vec<std::ops::Range<usize>> {
    word_positions(line, "vec4")
        .filter_map(|pos| {
            let after_type = &line[pos + "vec4".len()..];
            let rest = after_type.trim_start();
            let gap = after_type.len() - rest.len();
            let tail = rest.strip_prefix(param)?;
            let continues_ident = tail
                .bytes()
                .next()
                .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_');
            let tail = tail.trim_start();
            let assigns = tail.starts_with('=') && !tail.starts_with("==");
            (gap > 0 && !continues_ident && assigns).then(|| pos..pos + "vec4".len() + gap)
        })
        .collect()
}
