//! Failure-message templating.
//!
//! Both default and custom messages may reference `{name}`, `{tail_x}`,
//! `{tail_y}`, `{tip_x}`, `{tip_y}`, `{length}` and `{angle}`; the last two
//! also in the one-decimal forms `{length:.1f}` / `{angle:.1f}`. Messages
//! for point checks may reference `{name}`, `{x}` and `{y}`. Unknown
//! placeholders are left untouched.

use crate::grader::GradedVector;

pub(crate) fn vector_message(template: &str, name: &str, vector: Option<&GradedVector>) -> String {
    let mut out = template.replace("{name}", name);
    if let Some(v) = vector {
        out = out
            .replace("{length:.1f}", &format!("{:.1}", v.length))
            .replace("{angle:.1f}", &format!("{:.1}", v.angle))
            .replace("{tail_x}", &number(v.tail[0]))
            .replace("{tail_y}", &number(v.tail[1]))
            .replace("{tip_x}", &number(v.tip[0]))
            .replace("{tip_y}", &number(v.tip[1]))
            .replace("{length}", &number(v.length))
            .replace("{angle}", &number(v.angle));
    }
    out
}

pub(crate) fn point_message(template: &str, name: &str, coords: Option<[f64; 2]>) -> String {
    let mut out = template.replace("{name}", name);
    if let Some([x, y]) = coords {
        out = out.replace("{x}", &number(x)).replace("{y}", &number(y));
    }
    out
}

fn number(value: f64) -> String {
    format!("{}", value)
}
