//! Function-scope lookup: which function owns a given line.
//!
//! Built once per pass as a table so every pass agrees on scope boundaries.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::vocab::{TypeNames, is_control_keyword};

fn signature_regex() -> &'static Regex {
    static SIGNATURE: OnceLock<Regex> = OnceLock::new();
    SIGNATURE.get_or_init(|| {
        Regex::new(r"^\s*(?:(?:highp|mediump|lowp)\s+)?([A-Za-z_]\w*)\s+([A-Za-z_]\w*)\s*\(")
            .expect("Invalid function signature regex")
    })
}

fn output_param_regex() -> &'static Regex {
    static OUTPUT_PARAM: OnceLock<Regex> = OnceLock::new();
    OUTPUT_PARAM.get_or_init(|| {
        Regex::new(r"\bout\s+vec4\s+([A-Za-z_]\w*)").expect("Invalid output parameter regex")
    })
}

/// Name of the function whose signature starts on `line`, if any.
pub fn signature_name<'a>(line: &'a str, types: &TypeNames) -> Option<&'a str> {
    let caps = signature_regex().captures(line)?;
    let (ret, name) = (caps.get(1)?.as_str(), caps.get(2)?.as_str());
    (types.is_return_type(ret) && !types.is_type(name) && !is_control_keyword(name))
        .then_some(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub line: usize,
    pub name: String,
    pub is_entry: bool,
    /// Lines from the signature through the closing brace.
    pub body: Range<usize>,
    /// Name of the `out vec4` parameter, if the signature declares one.
    pub output_param: Option<String>,
}

/// Result of a backward scope lookup. `start` is `None` when no signature precedes the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeLookup {
    pub start: Option<usize>,
    pub is_entry: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FunctionScopes {
    functions: Vec<FunctionSignature>,
    /// For each line, index into `functions` of the nearest signature at or above it.
    owner: Vec<Option<usize>>,
}

impl FunctionScopes {
    pub fn build<S: AsRef<str>>(lines: &[S], types: &TypeNames, entry_point: &str) -> Self {
        let mut functions = Vec::new();
        let mut owner = Vec::with_capacity(lines.len());
        let mut current = None;

        for (i, line) in lines.iter().enumerate() {
            if let Some(name) = signature_name(line.as_ref(), types) {
                current = Some(functions.len());
                functions.push(FunctionSignature {
                    line: i,
                    name: name.to_string(),
                    is_entry: name == entry_point,
                    body: i..brace_span_end(lines, i),
                    output_param: output_param(lines, i),
                });
            }
            owner.push(current);
        }

        Self { functions, owner }
    }

    /// Backward lookup for the function owning `line`.
    pub fn locate(&self, line: usize) -> ScopeLookup {
        match self.owner(line) {
            Some(f) => ScopeLookup {
                start: Some(f.line),
                is_entry: f.is_entry,
            },
            None => ScopeLookup {
                start: None,
                is_entry: false,
            },
        }
    }

    pub fn owner(&self, line: usize) -> Option<&FunctionSignature> {
        self.owner
            .get(line)
            .copied()
            .flatten()
            .map(|idx| &self.functions[idx])
    }

    /// Whether `line` belongs to a function other than the entry point.
    pub fn in_helper_function(&self, line: usize) -> bool {
        self.owner(line).is_some_and(|f| !f.is_entry)
    }

    /// Whether `line` lies between a signature and its closing brace.
    pub fn in_function_body(&self, line: usize) -> bool {
        self.owner(line).is_some_and(|f| f.body.contains(&line))
    }

    pub fn entry(&self) -> Option<&FunctionSignature> {
        self.functions.iter().find(|f| f.is_entry)
    }

    pub fn first_function_line(&self) -> Option<usize> {
        self.functions.first().map(|f| f.line)
    }

    pub fn functions(&self) -> &[FunctionSignature] {
        &self.functions
    }
}

/// End (exclusive) of the balanced `{}` span that starts at or after the signature line.
fn brace_span_end<S: AsRef<str>>(lines: &[S], start: usize) -> usize {
    let mut depth: i32 = 0;
    let mut seen_open_brace = false;

    for (i, line) in lines.iter().enumerate().skip(start) {
        for c in line.as_ref().chars() {
            match c {
                '{' => {
                    seen_open_brace = true;
                    depth += 1;
                }
                '}' if seen_open_brace => {
                    depth -= 1;
                    if depth == 0 {
                        return i + 1;
                    }
                }
                _ => {}
            }
        }
        // A prototype such as `float f(float x);` has no body.
        if !seen_open_brace && line.as_ref().trim_end().ends_with(';') {
            return i + 1;
        }
    }

    lines.len()
}

fn output_param<S: AsRef<str>>(lines: &[S], start: usize) -> Option<String> {
    // Parameter lists occasionally wrap; look until the list closes.
    for line in lines.iter().skip(start).take(8) {
        let line = line.as_ref();
        if let Some(caps) = output_param_regex().captures(line) {
            return Some(caps[1].to_string());
        }
        if line.contains(')') {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(src: &str) -> FunctionScopes {
        let lines: Vec<&str> = src.lines().collect();
        FunctionScopes::build(&lines, &TypeNames::collect(&lines), "mainImage")
    }

    const SRC: &str = "\
float t = 1.0;
float hash(vec2 p) {
    float h = sin(p.x);
    return h;
}
void mainImage(out vec4 fragColor, in vec2 fragCoord)
{
    vec3 col = vec3(0.0);
    fragColor = vec4(col, 1.0);
}";

    #[test]
    fn signatures_are_detected_with_spans() {
        let s = scopes(SRC);
        let names: Vec<&str> = s.functions().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["hash", "mainImage"]);
        assert_eq!(s.functions()[0].body, 1..5);
        assert_eq!(s.functions()[1].body, 5..10);
        assert_eq!(s.first_function_line(), Some(1));
    }

    #[test]
    fn locate_scans_backward_to_nearest_signature() {
        let s = scopes(SRC);
        assert_eq!(
            s.locate(0),
            ScopeLookup {
                start: None,
                is_entry: false
            }
        );
        assert_eq!(
            s.locate(3),
            ScopeLookup {
                start: Some(1),
                is_entry: false
            }
        );
        assert_eq!(
            s.locate(8),
            ScopeLookup {
                start: Some(5),
                is_entry: true
            }
        );
        assert!(s.in_helper_function(2));
        assert!(!s.in_helper_function(7));
    }

    #[test]
    fn entry_records_output_parameter() {
        let s = scopes(SRC);
        assert_eq!(s.entry().unwrap().output_param.as_deref(), Some("fragColor"));

        let golfed = scopes("void mainImage(out vec4 O, vec2 U) { O = vec4(1.0); }");
        let entry = golfed.entry().unwrap();
        assert_eq!(entry.output_param.as_deref(), Some("O"));
        assert_eq!(entry.body, 0..1);
    }

    #[test]
    fn entry_match_is_exact_name() {
        let s = scopes("void mainImageHelper(vec2 p) {\n}\nvoid mainImage(out vec4 c, vec2 u) {\n}");
        assert!(!s.functions()[0].is_entry);
        assert!(s.functions()[1].is_entry);
    }

    #[test]
    fn assignments_and_calls_are_not_signatures() {
        let types = TypeNames::default();
        assert_eq!(signature_name("vec2 p = vec2(1.0);", &types), None);
        assert_eq!(signature_name("return vec2(1.0);", &types), None);
        assert_eq!(signature_name("    float d = map(p);", &types), None);
        assert_eq!(signature_name("vec3 render(in vec3 ro) {", &types), Some("render"));
    }
}
