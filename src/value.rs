use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::environment::FunctionDef;

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type RecordRef = Rc<RefCell<IndexMap<String, Value>>>;

const CIRCULAR: &str = "[Circular]";

/// A runtime value.
///
/// Arrays and records are shared handles: cloning a `Value` clones the handle,
/// so a mutation through one binding is visible through every other binding
/// that holds the same container. Scalars are copied.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(ArrayRef),
    Record(RecordRef),
    Function(Rc<FunctionDef>),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn record(fields: IndexMap<String, Value>) -> Self {
        Value::Record(Rc::new(RefCell::new(fields)))
    }

    pub fn str(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    fn is_object(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Record(_) | Value::Function(_))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Record(_) | Value::Function(_) => true,
        }
    }

    /// Numeric coercion with the same rules as JavaScript's `Number(x)`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Array(_) => string_to_number(&self.to_js_string()),
            Value::Record(_) | Value::Function(_) => f64::NAN,
        }
    }

    /// String coercion with the same rules as JavaScript's `String(x)`.
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Array(_) => self.join_items(&mut Vec::new()),
            Value::Record(_) | Value::Function(_) => "[object Object]".to_string(),
        }
    }

    /// `Array.prototype.join(",")`. An array that is already being joined
    /// further up `open` contributes an empty string.
    fn join_items(&self, open: &mut Vec<*const ()>) -> String {
        let Value::Array(items) = self else {
            return self.to_js_string();
        };
        let id = Rc::as_ptr(items) as *const ();
        if open.contains(&id) {
            return String::new();
        }
        open.push(id);
        let joined = items
            .borrow()
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                Value::Array(_) => v.join_items(open),
                other => other.to_js_string(),
            })
            .collect::<Vec<_>>()
            .join(",");
        open.pop();
        joined
    }

    /// Text written to the output sink by `log`.
    ///
    /// Strings are printed raw; arrays and records print as compact JSON.
    pub fn render(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Array(_) | Value::Record(_) => self.to_json().to_string(),
            Value::Function(def) => format!("[function {}]", def.name),
            other => other.to_js_string(),
        }
    }

    /// Loose (`==`) equality.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::String(_)) => *a == other.to_number(),
            (Value::String(_), Value::Number(b)) => self.to_number() == *b,
            (Value::Bool(_), _) => Value::Number(self.to_number()).loose_eq(other),
            (_, Value::Bool(_)) => self.loose_eq(&Value::Number(other.to_number())),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Record(a), Value::Record(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (a, b) if a.is_object() && !b.is_object() => {
                Value::String(a.to_js_string()).loose_eq(b)
            }
            (a, b) if b.is_object() && !a.is_object() => {
                a.loose_eq(&Value::String(b.to_js_string()))
            }
            _ => false,
        }
    }

    /// Ordering used by `<`, `>`, `<=` and `>=`. `None` means every relational
    /// operator yields `false` (a NaN was involved).
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        let a = self.to_primitive();
        let b = other.to_primitive();
        if let (Value::String(x), Value::String(y)) = (&a, &b) {
            return Some(x.encode_utf16().cmp(y.encode_utf16()));
        }
        a.to_number().partial_cmp(&b.to_number())
    }

    fn to_primitive(&self) -> Value {
        if self.is_object() {
            Value::String(self.to_js_string())
        } else {
            self.clone()
        }
    }

    pub fn from_json(json: &Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::array(items.iter().map(Value::from_json).collect()),
            Json::Object(map) => Value::record(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// JSON snapshot. A container nested inside itself becomes the string
    /// `"[Circular]"`.
    pub fn to_json(&self) -> Json {
        self.to_json_within(&mut Vec::new())
    }

    fn to_json_within(&self, open: &mut Vec<*const ()>) -> Json {
        let id = match self {
            Value::Null | Value::Function(_) => return Json::Null,
            Value::Bool(b) => return Json::Bool(*b),
            Value::Number(n) => return number_to_json(*n),
            Value::String(s) => return Json::String(s.clone()),
            Value::Array(items) => Rc::as_ptr(items) as *const (),
            Value::Record(fields) => Rc::as_ptr(fields) as *const (),
        };
        if open.contains(&id) {
            return Json::String(CIRCULAR.to_string());
        }
        open.push(id);
        let json = match self {
            Value::Array(items) => Json::Array(
                items.borrow().iter().map(|v| v.to_json_within(open)).collect(),
            ),
            Value::Record(fields) => Json::Object(
                fields
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_within(open)))
                    .collect(),
            ),
            _ => Json::Null,
        };
        open.pop();
        json
    }
}

impl PartialEq for Value {
    /// Structural equality, used by tests and the stores. Language-level
    /// equality is [`Value::loose_eq`].
    fn eq(&self, other: &Self) -> bool {
        structural_eq(self, other, &mut Vec::new())
    }
}

/// Pairs of containers already under comparison count as equal, so cyclic
/// values compare without recursing forever.
fn structural_eq(a: &Value, b: &Value, open: &mut Vec<(*const (), *const ())>) -> bool {
    let pair = match (a, b) {
        (Value::Null, Value::Null) => return true,
        (Value::Bool(x), Value::Bool(y)) => return x == y,
        (Value::Number(x), Value::Number(y)) => return x == y || (x.is_nan() && y.is_nan()),
        (Value::String(x), Value::String(y)) => return x == y,
        (Value::Function(x), Value::Function(y)) => return Rc::ptr_eq(x, y),
        (Value::Array(x), Value::Array(y)) => (Rc::as_ptr(x) as *const (), Rc::as_ptr(y) as *const ()),
        (Value::Record(x), Value::Record(y)) => (Rc::as_ptr(x) as *const (), Rc::as_ptr(y) as *const ()),
        _ => return false,
    };
    if pair.0 == pair.1 || open.contains(&pair) {
        return true;
    }
    open.push(pair);
    let equal = match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(l, r)| structural_eq(l, r, open))
        }
        (Value::Record(x), Value::Record(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len()
                && x.iter().all(|(k, l)| y.get(k).is_some_and(|r| structural_eq(l, r, open)))
        }
        _ => false,
    };
    open.pop();
    equal
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn number_to_json(n: f64) -> Json {
    if !n.is_finite() {
        return Json::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Json::from(n as i64);
    }
    serde_json::Number::from_f64(n).map_or(Json::Null, Json::Number)
}

/// Format a number the way JavaScript's `Number.prototype.toString` does for
/// the common cases: integers without a fraction, exponent notation outside
/// `[1e-6, 1e21)`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return n.to_string();
    }
    let formatted = format!("{:e}", n);
    match formatted.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => formatted,
    }
}

/// JavaScript `StringToNumber`: surrounding whitespace is ignored, the empty
/// string is `0`, and anything that is not a complete numeric literal is NaN.
pub fn string_to_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = t.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }
    if decimal_literal_len(t) == Some(t.len()) {
        t.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// JavaScript `parseFloat`: parses the longest decimal prefix.
pub fn parse_float_prefix(s: &str) -> f64 {
    let t = s.trim_start();
    let unsigned = t.trim_start_matches(['+', '-']);
    if unsigned.len() + 1 >= t.len() && unsigned.starts_with("Infinity") {
        return if t.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    match decimal_literal_len(t) {
        Some(len) => t[..len].parse().unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

/// JavaScript `Math.round`: halves round toward positive infinity.
pub fn js_round(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
    .unwrap_or(f64::NAN)
}

/// Length of the longest prefix of `s` that forms a decimal literal
/// (`[+-]digits[.digits][e[+-]digits]`), or `None` if there is none.
fn decimal_literal_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let mut digits = i - int_start;
    if bytes.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let mut j = frac_start;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    Some(i)
}
