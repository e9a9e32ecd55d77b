//! Literal syntax for the two generated languages.
//!
//! Parameter values are rendered once for the hardware compiler driver
//! ([`Scala`]) and once for the test harness ([`Python`]). Both renderers
//! share string escaping so that any [`ParamValue`] round-trips as a literal.

use efgen_config::ParamValue;

/// Renders scalar values as source literals of one target language.
pub trait LiteralSyntax {
    /// Renders a boolean literal.
    fn boolean(&self, b: bool) -> String;

    /// Renders an integer literal.
    fn integer(&self, n: i64) -> String;

    /// Renders a non-finite float (NaN or infinity).
    fn non_finite(&self, x: f64) -> String;

    /// Renders a double-quoted, escaped string literal.
    fn string(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('"');
        for c in s.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
        out.push('"');
        out
    }

    /// Renders a float literal. Finite values always carry a decimal point
    /// or an exponent.
    fn float(&self, x: f64) -> String {
        if x.is_finite() {
            format!("{x:?}")
        } else {
            self.non_finite(x)
        }
    }

    /// Renders any parameter value.
    fn value(&self, v: &ParamValue) -> String {
        match v {
            ParamValue::Boolean(b) => self.boolean(*b),
            ParamValue::Integer(n) => self.integer(*n),
            ParamValue::Float(x) => self.float(*x),
            ParamValue::String(s) => self.string(s),
        }
    }
}

/// Scala literal syntax, used by the Chisel driver.
#[derive(Debug, Clone, Copy)]
pub struct Scala;

impl LiteralSyntax for Scala {
    fn boolean(&self, b: bool) -> String {
        b.to_string()
    }

    fn integer(&self, n: i64) -> String {
        if i32::try_from(n).is_ok() {
            n.to_string()
        } else {
            format!("{n}L")
        }
    }

    fn non_finite(&self, x: f64) -> String {
        if x.is_nan() {
            "Double.NaN".to_string()
        } else if x > 0.0 {
            "Double.PositiveInfinity".to_string()
        } else {
            "Double.NegativeInfinity".to_string()
        }
    }
}

/// Python literal syntax, used by the cocotb harness.
#[derive(Debug, Clone, Copy)]
pub struct Python;

impl LiteralSyntax for Python {
    fn boolean(&self, b: bool) -> String {
        if b { "True" } else { "False" }.to_string()
    }

    fn integer(&self, n: i64) -> String {
        n.to_string()
    }

    fn non_finite(&self, x: f64) -> String {
        if x.is_nan() {
            "float(\"nan\")".to_string()
        } else if x > 0.0 {
            "float(\"inf\")".to_string()
        } else {
            "float(\"-inf\")".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scala_integers() {
        assert_eq!(Scala.integer(8), "8");
        assert_eq!(Scala.integer(-1), "-1");
        assert_eq!(Scala.integer(5_000_000_000), "5000000000L");
    }

    #[test]
    fn booleans_per_language() {
        assert_eq!(Scala.boolean(true), "true");
        assert_eq!(Python.boolean(true), "True");
        assert_eq!(Python.boolean(false), "False");
    }

    #[test]
    fn floats_keep_decimal_point() {
        assert_eq!(Scala.float(2.0), "2.0");
        assert_eq!(Python.float(0.25), "0.25");
        assert_eq!(Scala.float(f64::NAN), "Double.NaN");
        assert_eq!(Python.float(f64::NEG_INFINITY), "float(\"-inf\")");
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(Scala.string("a\"b\\c"), r#""a\"b\\c""#);
        assert_eq!(Python.string("line\nnext"), r#""line\nnext""#);
        assert_eq!(Python.string("\u{1}"), r#""\u0001""#);
    }

    #[test]
    fn value_dispatch() {
        assert_eq!(Python.value(&ParamValue::String("tx".into())), "\"tx\"");
        assert_eq!(Scala.value(&ParamValue::Integer(16)), "16");
    }
}
