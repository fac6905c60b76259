//! Function library available to templates.
//!
//! Go's builtins plus the string, math, list, dict and encoding helpers
//! named after the Sprig library. A piped value arrives as the last
//! argument, so `{{.NAME | replace "-" "_"}}` calls `replace("-", "_", NAME)`.
//!
//! Integer arithmetic is checked: overflow and division by zero are errors.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::LazyLock;

type Func = fn(&[Value]) -> Result<Value, String>;

static FUNCS: LazyLock<BTreeMap<&'static str, Func>> = LazyLock::new(|| {
    let entries: &[(&'static str, Func)] = &[
        ("and", and),
        ("or", or),
        ("not", not),
        ("eq", eq),
        ("ne", ne),
        ("lt", lt),
        ("le", le),
        ("gt", gt),
        ("ge", ge),
        ("len", len),
        ("index", index),
        ("print", print),
        ("printf", printf),
        ("println", println),
        ("slice", slice),
        ("html", html),
        ("js", js),
        ("urlquery", urlquery),
        ("add", add),
        ("add1", add1),
        ("sub", sub),
        ("mul", mul),
        ("div", div),
        ("mod", modulo),
        ("max", max),
        ("min", min),
        ("until", until),
        ("upper", upper),
        ("lower", lower),
        ("title", title),
        ("untitle", untitle),
        ("trim", trim),
        ("trimAll", trim_all),
        ("trimPrefix", trim_prefix),
        ("trimSuffix", trim_suffix),
        ("replace", replace),
        ("contains", contains),
        ("hasPrefix", has_prefix),
        ("hasSuffix", has_suffix),
        ("repeat", repeat),
        ("substr", substr),
        ("trunc", trunc),
        ("nospace", nospace),
        ("quote", quote),
        ("squote", squote),
        ("cat", cat),
        ("indent", indent),
        ("nindent", nindent),
        ("default", default),
        ("empty", empty),
        ("coalesce", coalesce),
        ("ternary", ternary),
        ("list", list),
        ("join", join),
        ("splitList", split_list),
        ("split", split),
        ("regexMatch", regex_match),
        ("regexReplaceAll", regex_replace_all),
        ("dict", dict),
        ("get", get),
        ("hasKey", has_key),
        ("keys", keys),
        ("first", first),
        ("last", last),
        ("has", has),
        ("camelcase", camelcase),
        ("snakecase", snakecase),
        ("kebabcase", kebabcase),
        ("toString", to_string),
        ("toJson", to_json),
        ("b64enc", b64enc),
        ("b64dec", b64dec),
        ("env", env),
    ];
    entries.iter().copied().collect()
});

/// Whether a function with this name exists.
pub(super) fn exists(name: &str) -> bool {
    FUNCS.contains_key(name)
}

/// Call a function by name.
pub(super) fn call(name: &str, args: &[Value]) -> Result<Value, String> {
    let func = FUNCS
        .get(name)
        .ok_or_else(|| format!("function {:?} not defined", name))?;
    func(args).map_err(|e| format!("error calling {}: {}", name, e))
}

/// Template truthiness: false, 0, nil, and empty strings/lists/maps are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Text form of a value as printed by `{{ }}`.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(display).collect();
            format!("[{}]", items.join(" "))
        }
        Value::Object(map) => {
            let pairs: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}:{}", k, display(v)))
                .collect();
            format!("map[{}]", pairs.join(" "))
        }
    }
}

pub(super) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

fn expect_args(args: &[Value], count: usize) -> Result<(), String> {
    if args.len() == count {
        Ok(())
    } else {
        Err(format!(
            "wrong number of args: want {} got {}",
            count,
            args.len()
        ))
    }
}

fn expect_at_least(args: &[Value], count: usize) -> Result<(), String> {
    if args.len() >= count {
        Ok(())
    } else {
        Err(format!(
            "wrong number of args: want at least {} got {}",
            count,
            args.len()
        ))
    }
}

fn as_int(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| format!("invalid number {}", n)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("expected integer, got {:?}", s)),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Null => Ok(0),
        other => Err(format!("expected integer, got {}", type_name(other))),
    }
}

fn as_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn string(s: impl Into<String>) -> Result<Value, String> {
    Ok(Value::String(s.into()))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Result<Ordering, String> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y)
                .ok_or_else(|| "incomparable numbers".to_string())
        }
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        _ => Err(format!(
            "incompatible types for comparison: {} and {}",
            type_name(a),
            type_name(b)
        )),
    }
}

// ============================================================================
// Builtins
// ============================================================================

fn and(args: &[Value]) -> Result<Value, String> {
    expect_at_least(args, 1)?;
    for arg in args {
        if !is_truthy(arg) {
            return Ok(arg.clone());
        }
    }
    Ok(args[args.len() - 1].clone())
}

fn or(args: &[Value]) -> Result<Value, String> {
    expect_at_least(args, 1)?;
    for arg in args {
        if is_truthy(arg) {
            return Ok(arg.clone());
        }
    }
    Ok(args[args.len() - 1].clone())
}

fn not(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    Ok(Value::Bool(!is_truthy(&args[0])))
}

fn eq(args: &[Value]) -> Result<Value, String> {
    expect_at_least(args, 2)?;
    Ok(Value::Bool(
        args[1..].iter().any(|other| values_equal(&args[0], other)),
    ))
}

fn ne(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    Ok(Value::Bool(!values_equal(&args[0], &args[1])))
}

fn lt(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    Ok(Value::Bool(compare(&args[0], &args[1])? == Ordering::Less))
}

fn le(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    Ok(Value::Bool(compare(&args[0], &args[1])? != Ordering::Greater))
}

fn gt(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    Ok(Value::Bool(compare(&args[0], &args[1])? == Ordering::Greater))
}

fn ge(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    Ok(Value::Bool(compare(&args[0], &args[1])? != Ordering::Less))
}

fn len(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    let n = match &args[0] {
        Value::String(s) => s.len(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => return Err(format!("len of {}", type_name(other))),
    };
    Ok(Value::from(n))
}

fn index(args: &[Value]) -> Result<Value, String> {
    expect_at_least(args, 1)?;
    let mut current = args[0].clone();
    for key in &args[1..] {
        current = match (&current, key) {
            (Value::Array(items), _) => {
                let i = as_int(key)?;
                usize::try_from(i)
                    .ok()
                    .and_then(|i| items.get(i).cloned())
                    .ok_or_else(|| format!("index out of range: {}", i))?
            }
            (Value::Object(map), Value::String(k)) => map.get(k).cloned().unwrap_or(Value::Null),
            (Value::Null, _) => Value::Null,
            (other, _) => return Err(format!("can't index item of type {}", type_name(other))),
        };
    }
    Ok(current)
}

fn print(args: &[Value]) -> Result<Value, String> {
    string(sprint(args))
}

/// Operands concatenated with a space between two non-strings.
fn sprint(args: &[Value]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 && !args[i - 1].is_string() && !arg.is_string() {
            out.push(' ');
        }
        out.push_str(&display(arg));
    }
    out
}

fn println(args: &[Value]) -> Result<Value, String> {
    let parts: Vec<String> = args.iter().map(display).collect();
    string(format!("{}\n", parts.join(" ")))
}

fn printf(args: &[Value]) -> Result<Value, String> {
    expect_at_least(args, 1)?;
    let format = display(&args[0]);
    let mut rest = args[1..].iter();
    let mut out = String::new();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut precision: Option<usize> = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut digits = String::new();
            while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                digits.push(*d);
                chars.next();
            }
            precision = digits.parse().ok();
        }

        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        let Some(arg) = rest.next() else {
            out.push_str(&format!("%!{}(MISSING)", verb));
            continue;
        };
        match verb {
            's' | 'v' | 't' => out.push_str(&display(arg)),
            'd' => out.push_str(&as_int(arg)?.to_string()),
            'q' => out.push_str(&format!("{:?}", display(arg))),
            'f' => {
                let f = arg
                    .as_f64()
                    .ok_or_else(|| format!("%f of {}", type_name(arg)))?;
                out.push_str(&format!("{:.*}", precision.unwrap_or(6), f));
            }
            other => out.push_str(&format!("%!{}({})", other, display(arg))),
        }
    }
    string(out)
}

/// `slice x 1 2` is `x[1:2]`; strings are sliced by byte offset.
fn slice(args: &[Value]) -> Result<Value, String> {
    expect_at_least(args, 1)?;
    let bounds = args[1..]
        .iter()
        .map(|arg| {
            let i = as_int(arg)?;
            usize::try_from(i).map_err(|_| format!("index out of range: {}", i))
        })
        .collect::<Result<Vec<usize>, String>>()?;

    match &args[0] {
        Value::String(s) => {
            if bounds.len() > 2 {
                return Err("cannot 3-index slice a string".to_string());
            }
            let (start, end) = slice_bounds(&bounds, s.len())?;
            s.get(start..end)
                .map(|part| Value::String(part.to_string()))
                .ok_or_else(|| format!("slice {}:{} splits a character", start, end))
        }
        Value::Array(items) => {
            if bounds.len() > 3 {
                return Err(format!("too many slice indexes: {}", bounds.len()));
            }
            let (start, end) = slice_bounds(&bounds, items.len())?;
            if let Some(&cap) = bounds.get(2)
                && (cap < end || cap > items.len())
            {
                return Err(format!("invalid slice index: {} > {}", end, cap));
            }
            Ok(Value::Array(items[start..end].to_vec()))
        }
        Value::Null => Err("slice of untyped nil".to_string()),
        other => Err(format!("can't slice item of type {}", type_name(other))),
    }
}

fn slice_bounds(bounds: &[usize], len: usize) -> Result<(usize, usize), String> {
    let start = bounds.first().copied().unwrap_or(0);
    let end = bounds.get(1).copied().unwrap_or(len);
    if start > end || end > len {
        return Err(format!(
            "index out of range: {}:{} with length {}",
            start, end, len
        ));
    }
    Ok((start, end))
}

fn html(args: &[Value]) -> Result<Value, String> {
    let text = sprint(args);
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '\0' => out.push('\u{FFFD}'),
            c => out.push(c),
        }
    }
    string(out)
}

fn js(args: &[Value]) -> Result<Value, String> {
    let text = sprint(args);
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '&' => out.push_str("\\u0026"),
            '=' => out.push_str("\\u003D"),
            c if c < ' ' => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    string(out)
}

/// Query-string escaping: unreserved bytes stay, space becomes `+`.
fn urlquery(args: &[Value]) -> Result<Value, String> {
    let text = sprint(args);
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte))
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    string(out)
}

// ============================================================================
// Strings
// ============================================================================

fn upper(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    string(display(&args[0]).to_uppercase())
}

fn lower(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    string(display(&args[0]).to_lowercase())
}

fn map_word_starts(s: &str, f: impl Fn(char) -> String) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            at_start = true;
            out.push(c);
        } else if at_start {
            out.push_str(&f(c));
            at_start = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn title(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    string(map_word_starts(&display(&args[0]), |c| {
        c.to_uppercase().collect()
    }))
}

fn untitle(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    string(map_word_starts(&display(&args[0]), |c| {
        c.to_lowercase().collect()
    }))
}

fn trim(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    string(display(&args[0]).trim())
}

fn trim_all(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    let cutset: Vec<char> = display(&args[0]).chars().collect();
    string(display(&args[1]).trim_matches(cutset.as_slice()))
}

fn trim_prefix(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    let (prefix, s) = (display(&args[0]), display(&args[1]));
    string(s.strip_prefix(prefix.as_str()).unwrap_or(&s))
}

fn trim_suffix(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    let (suffix, s) = (display(&args[0]), display(&args[1]));
    string(s.strip_suffix(suffix.as_str()).unwrap_or(&s))
}

fn replace(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 3)?;
    let (old, new, s) = (display(&args[0]), display(&args[1]), display(&args[2]));
    string(s.replace(old.as_str(), &new))
}

fn contains(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    Ok(Value::Bool(
        display(&args[1]).contains(display(&args[0]).as_str()),
    ))
}

fn has_prefix(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    Ok(Value::Bool(
        display(&args[1]).starts_with(display(&args[0]).as_str()),
    ))
}

fn has_suffix(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    Ok(Value::Bool(
        display(&args[1]).ends_with(display(&args[0]).as_str()),
    ))
}

fn repeat(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    let count = usize::try_from(as_int(&args[0])?).map_err(|_| "negative repeat count")?;
    string(display(&args[1]).repeat(count))
}

fn substr(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 3)?;
    let (start, end) = (as_int(&args[0])?, as_int(&args[1])?);
    let chars: Vec<char> = display(&args[2]).chars().collect();
    let len = chars.len() as i64;
    let start = start.clamp(0, len) as usize;
    let end = if end < 0 || end > len { len } else { end };
    let end = end as usize;
    if start >= end {
        return string("");
    }
    string(chars[start..end].iter().collect::<String>())
}

fn trunc(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    let n = as_int(&args[0])?;
    let chars: Vec<char> = display(&args[1]).chars().collect();
    let len = chars.len() as i64;
    let kept: String = if n >= 0 {
        chars[..n.min(len) as usize].iter().collect()
    } else {
        chars[(len + n).max(0) as usize..].iter().collect()
    };
    string(kept)
}

fn nospace(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    string(
        display(&args[0])
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>(),
    )
}

fn quote(args: &[Value]) -> Result<Value, String> {
    let quoted: Vec<String> = args
        .iter()
        .filter(|a| !a.is_null())
        .map(|a| format!("{:?}", display(a)))
        .collect();
    string(quoted.join(" "))
}

fn squote(args: &[Value]) -> Result<Value, String> {
    let quoted: Vec<String> = args
        .iter()
        .filter(|a| !a.is_null())
        .map(|a| format!("'{}'", display(a)))
        .collect();
    string(quoted.join(" "))
}

fn cat(args: &[Value]) -> Result<Value, String> {
    let parts: Vec<String> = args
        .iter()
        .filter(|a| !a.is_null())
        .map(display)
        .collect();
    string(parts.join(" "))
}

fn indent_text(spaces: i64, text: &str) -> String {
    let pad = " ".repeat(usize::try_from(spaces).unwrap_or(0));
    text.split('\n')
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    string(indent_text(as_int(&args[0])?, &display(&args[1])))
}

fn nindent(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    string(format!(
        "\n{}",
        indent_text(as_int(&args[0])?, &display(&args[1]))
    ))
}

// ============================================================================
// Defaults and logic
// ============================================================================

fn default(args: &[Value]) -> Result<Value, String> {
    expect_at_least(args, 1)?;
    match args.get(1) {
        Some(given) if is_truthy(given) => Ok(given.clone()),
        _ => Ok(args[0].clone()),
    }
}

fn empty(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    Ok(Value::Bool(!is_truthy(&args[0])))
}

fn coalesce(args: &[Value]) -> Result<Value, String> {
    Ok(args
        .iter()
        .find(|a| is_truthy(a))
        .cloned()
        .unwrap_or(Value::Null))
}

fn ternary(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 3)?;
    Ok(if is_truthy(&args[2]) {
        args[0].clone()
    } else {
        args[1].clone()
    })
}

// ============================================================================
// Math
// ============================================================================

fn overflow(op: &str) -> String {
    format!("integer overflow in {}", op)
}

fn add(args: &[Value]) -> Result<Value, String> {
    let mut total: i64 = 0;
    for arg in args {
        total = total.checked_add(as_int(arg)?).ok_or_else(|| overflow("add"))?;
    }
    Ok(Value::from(total))
}

fn add1(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    as_int(&args[0])?
        .checked_add(1)
        .map(Value::from)
        .ok_or_else(|| overflow("add1"))
}

fn sub(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    as_int(&args[0])?
        .checked_sub(as_int(&args[1])?)
        .map(Value::from)
        .ok_or_else(|| overflow("sub"))
}

fn mul(args: &[Value]) -> Result<Value, String> {
    expect_at_least(args, 1)?;
    let mut product: i64 = 1;
    for arg in args {
        product = product.checked_mul(as_int(arg)?).ok_or_else(|| overflow("mul"))?;
    }
    Ok(Value::from(product))
}

fn div(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    let (a, b) = (as_int(&args[0])?, as_int(&args[1])?);
    if b == 0 {
        return Err("integer divide by zero".to_string());
    }
    a.checked_div(b).map(Value::from).ok_or_else(|| overflow("div"))
}

fn modulo(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    let (a, b) = (as_int(&args[0])?, as_int(&args[1])?);
    if b == 0 {
        return Err("integer divide by zero".to_string());
    }
    a.checked_rem(b).map(Value::from).ok_or_else(|| overflow("mod"))
}

fn max(args: &[Value]) -> Result<Value, String> {
    expect_at_least(args, 1)?;
    let mut best = as_int(&args[0])?;
    for arg in &args[1..] {
        best = best.max(as_int(arg)?);
    }
    Ok(Value::from(best))
}

fn min(args: &[Value]) -> Result<Value, String> {
    expect_at_least(args, 1)?;
    let mut best = as_int(&args[0])?;
    for arg in &args[1..] {
        best = best.min(as_int(arg)?);
    }
    Ok(Value::from(best))
}

const UNTIL_LIMIT: u64 = 1_000_000;

/// `until 3` is `[0 1 2]`; a negative count steps down from 0.
fn until(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    let n = as_int(&args[0])?;
    if n.unsigned_abs() > UNTIL_LIMIT {
        return Err(format!("count {} exceeds {}", n, UNTIL_LIMIT));
    }
    let items: Vec<Value> = if n >= 0 {
        (0..n).map(Value::from).collect()
    } else {
        (n + 1..=0).rev().map(Value::from).collect()
    };
    Ok(Value::Array(items))
}

// ============================================================================
// Lists
// ============================================================================

fn list(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Array(args.to_vec()))
}

fn join(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    let sep = display(&args[0]);
    let parts: Vec<String> = as_list(&args[1]).iter().map(display).collect();
    string(parts.join(&sep))
}

fn split_list(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    let (sep, s) = (display(&args[0]), display(&args[1]));
    Ok(Value::Array(
        s.split(sep.as_str())
            .map(|part| Value::String(part.to_string()))
            .collect(),
    ))
}

/// `split "." "a.b"` is the map `{_0: a, _1: b}`.
fn split(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    let (sep, s) = (display(&args[0]), display(&args[1]));
    let parts: Map<String, Value> = s
        .split(sep.as_str())
        .enumerate()
        .map(|(i, part)| (format!("_{}", i), Value::String(part.to_string())))
        .collect();
    Ok(Value::Object(parts))
}

fn compile_regex(pattern: &Value) -> Result<Regex, String> {
    Regex::new(&display(pattern)).map_err(|e| e.to_string())
}

fn regex_match(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    let re = compile_regex(&args[0])?;
    Ok(Value::Bool(re.is_match(&display(&args[1]))))
}

/// `regexReplaceAll REGEX TEXT REPLACEMENT`; `$1`/`${name}` expand groups.
fn regex_replace_all(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 3)?;
    let re = compile_regex(&args[0])?;
    let (text, replacement) = (display(&args[1]), display(&args[2]));
    string(re.replace_all(&text, replacement.as_str()).into_owned())
}

fn first(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    Ok(as_list(&args[0]).first().cloned().unwrap_or(Value::Null))
}

fn last(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    Ok(as_list(&args[0]).last().cloned().unwrap_or(Value::Null))
}

fn has(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    Ok(Value::Bool(
        as_list(&args[1])
            .iter()
            .any(|item| values_equal(item, &args[0])),
    ))
}

// ============================================================================
// Dicts
// ============================================================================

/// `dict "a" 1 "b" 2`; a trailing key without a value maps to `""`.
fn dict(args: &[Value]) -> Result<Value, String> {
    let mut map = Map::new();
    for pair in args.chunks(2) {
        let value = pair.get(1).cloned().unwrap_or_else(|| Value::String(String::new()));
        map.insert(display(&pair[0]), value);
    }
    Ok(Value::Object(map))
}

fn expect_map<'a>(value: &'a Value) -> Result<&'a Map<String, Value>, String> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected map, got {}", type_name(other))),
    }
}

/// Missing keys give `""`.
fn get(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    let map = expect_map(&args[0])?;
    Ok(map
        .get(&display(&args[1]))
        .cloned()
        .unwrap_or_else(|| Value::String(String::new())))
}

fn has_key(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 2)?;
    let map = expect_map(&args[0])?;
    Ok(Value::Bool(map.contains_key(&display(&args[1]))))
}

/// Keys of every given map, sorted.
fn keys(args: &[Value]) -> Result<Value, String> {
    expect_at_least(args, 1)?;
    let mut all = Vec::new();
    for arg in args {
        all.extend(expect_map(arg)?.keys().cloned());
    }
    all.sort();
    Ok(Value::Array(all.into_iter().map(Value::String).collect()))
}

// ============================================================================
// Case conversion
// ============================================================================

/// Split an identifier into words on separators and case boundaries.
///
/// `"HTTPServer_name"` splits into `["HTTP", "Server", "name"]`.
fn words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn camelcase(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    let out: String = words(&display(&args[0]))
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect();
    string(out)
}

fn snakecase(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    let words: Vec<String> = words(&display(&args[0]))
        .iter()
        .map(|w| w.to_lowercase())
        .collect();
    string(words.join("_"))
}

fn kebabcase(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    let words: Vec<String> = words(&display(&args[0]))
        .iter()
        .map(|w| w.to_lowercase())
        .collect();
    string(words.join("-"))
}

// ============================================================================
// Conversion
// ============================================================================

fn to_string(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    string(display(&args[0]))
}

fn to_json(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    serde_json::to_string(&args[0])
        .map(Value::String)
        .map_err(|e| e.to_string())
}

// ============================================================================
// Encoding and environment
// ============================================================================

fn b64enc(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    string(BASE64.encode(display(&args[0])))
}

fn b64dec(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    let bytes = BASE64
        .decode(display(&args[0]))
        .map_err(|e| e.to_string())?;
    String::from_utf8(bytes)
        .map(Value::String)
        .map_err(|_| "decoded value is not valid UTF-8".to_string())
}

/// Unset or non-UTF-8 variables read as `""`.
fn env(args: &[Value]) -> Result<Value, String> {
    expect_args(args, 1)?;
    string(std::env::var(display(&args[0])).unwrap_or_default())
}
