//! General-purpose template utilities under their sprig names.
//!
//! Tera's built-ins (`upper`, `lower`, `title`, `trim`, `replace`, `default`,
//! `date`, `join`, `split`, `first`, `last`, `indent`, `now`, `range`, ...)
//! already cover part of the set; the names registered here fill the rest.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use heck::{ToKebabCase, ToPascalCase, ToSnakeCase};
use tera::{Map, Result, Tera, Value};

pub(super) fn register(tera: &mut Tera) {
    // strings
    tera.register_filter("trimPrefix", trim_prefix);
    tera.register_filter("trimSuffix", trim_suffix);
    tera.register_filter("trimAll", trim_all);
    tera.register_filter("hasPrefix", has_prefix);
    tera.register_filter("hasSuffix", has_suffix);
    tera.register_filter("contains", contains);
    tera.register_filter("repeat", repeat);
    tera.register_filter("nospace", nospace);
    tera.register_filter("abbrev", abbrev);
    tera.register_filter("initials", initials);
    tera.register_filter("untitle", untitle);
    tera.register_filter("quote", quote);
    tera.register_filter("squote", squote);
    tera.register_filter("nindent", nindent);
    tera.register_filter("snakecase", snakecase);
    tera.register_filter("camelcase", camelcase);
    tera.register_filter("kebabcase", kebabcase);
    tera.register_filter("b64enc", b64enc);
    tera.register_filter("b64dec", b64dec);

    // data
    tera.register_filter("toJson", to_json);
    tera.register_filter("toPrettyJson", to_pretty_json);
    tera.register_filter("toString", to_string);
    tera.register_filter("empty", empty);
    tera.register_filter("ternary", ternary);
    tera.register_filter("hasKey", has_key);
    tera.register_filter("keys", keys);
    tera.register_filter("uniq", uniq);
    tera.register_filter("compact", compact);

    // math
    tera.register_filter("add", add);
    tera.register_filter("sub", sub);
    tera.register_filter("mul", mul);
    tera.register_filter("div", div);
    tera.register_filter("mod", modulo);
    tera.register_filter("max", max);
    tera.register_filter("min", min);

    tera.register_function("dict", dict);
    tera.register_function("cat", cat);
    tera.register_function("coalesce", coalesce);
    tera.register_function("uuidv4", uuidv4);
}

type Args = HashMap<String, Value>;

fn as_str<'a>(value: &'a Value, filter: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("{filter} filter expects a string")))
}

fn str_arg<'a>(args: &'a Args, filter: &str, name: &str) -> Result<&'a str> {
    args.get(name).and_then(Value::as_str).ok_or_else(|| {
        tera::Error::msg(format!("{filter} filter expects a string `{name}` argument"))
    })
}

fn usize_arg(args: &Args, filter: &str, name: &str) -> Result<usize> {
    args.get(name)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            tera::Error::msg(format!(
                "{filter} filter expects a non-negative integer `{name}` argument"
            ))
        })
}

/// Text form of a value: strings as-is, everything else as JSON.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Sprig's notion of an empty value.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn trim_prefix(value: &Value, args: &Args) -> Result<Value> {
    let s = as_str(value, "trimPrefix")?;
    let prefix = str_arg(args, "trimPrefix", "prefix")?;
    Ok(Value::from(s.strip_prefix(prefix).unwrap_or(s)))
}

fn trim_suffix(value: &Value, args: &Args) -> Result<Value> {
    let s = as_str(value, "trimSuffix")?;
    let suffix = str_arg(args, "trimSuffix", "suffix")?;
    Ok(Value::from(s.strip_suffix(suffix).unwrap_or(s)))
}

fn trim_all(value: &Value, args: &Args) -> Result<Value> {
    let s = as_str(value, "trimAll")?;
    let chars = str_arg(args, "trimAll", "chars")?;
    Ok(Value::from(s.trim_matches(|c| chars.contains(c))))
}

fn has_prefix(value: &Value, args: &Args) -> Result<Value> {
    let s = as_str(value, "hasPrefix")?;
    Ok(Value::Bool(s.starts_with(str_arg(args, "hasPrefix", "prefix")?)))
}

fn has_suffix(value: &Value, args: &Args) -> Result<Value> {
    let s = as_str(value, "hasSuffix")?;
    Ok(Value::Bool(s.ends_with(str_arg(args, "hasSuffix", "suffix")?)))
}

fn contains(value: &Value, args: &Args) -> Result<Value> {
    let needle = args
        .get("substr")
        .ok_or_else(|| tera::Error::msg("contains filter expects a `substr` argument"))?;
    match value {
        Value::String(s) => Ok(Value::Bool(s.contains(as_str(needle, "contains")?))),
        Value::Array(items) => Ok(Value::Bool(items.contains(needle))),
        _ => Err(tera::Error::msg("contains filter expects a string or an array")),
    }
}

fn repeat(value: &Value, args: &Args) -> Result<Value> {
    let s = as_str(value, "repeat")?;
    Ok(Value::from(s.repeat(usize_arg(args, "repeat", "count")?)))
}

fn nospace(value: &Value, _args: &Args) -> Result<Value> {
    let s = as_str(value, "nospace")?;
    Ok(Value::from(
        s.chars().filter(|c| !c.is_whitespace()).collect::<String>(),
    ))
}

fn abbrev(value: &Value, args: &Args) -> Result<Value> {
    let s = as_str(value, "abbrev")?;
    let width = usize_arg(args, "abbrev", "width")?;
    if width < 4 || s.chars().count() <= width {
        return Ok(Value::from(s));
    }
    let head: String = s.chars().take(width - 3).collect();
    Ok(Value::from(format!("{head}...")))
}

fn initials(value: &Value, _args: &Args) -> Result<Value> {
    let s = as_str(value, "initials")?;
    Ok(Value::from(
        s.split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect::<String>(),
    ))
}

fn untitle(value: &Value, _args: &Args) -> Result<Value> {
    let s = as_str(value, "untitle")?;
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start && !c.is_whitespace() {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    Ok(Value::from(out))
}

fn quote(value: &Value, _args: &Args) -> Result<Value> {
    Ok(Value::from(format!("{:?}", text(value))))
}

fn squote(value: &Value, _args: &Args) -> Result<Value> {
    Ok(Value::from(format!("'{}'", text(value))))
}

fn nindent(value: &Value, args: &Args) -> Result<Value> {
    let s = as_str(value, "nindent")?;
    let pad = " ".repeat(usize_arg(args, "nindent", "spaces")?);
    let body = s
        .split('\n')
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Value::from(format!("\n{body}")))
}

fn snakecase(value: &Value, _args: &Args) -> Result<Value> {
    Ok(Value::from(as_str(value, "snakecase")?.to_snake_case()))
}

// sprig's camelcase produces UpperCamelCase.
fn camelcase(value: &Value, _args: &Args) -> Result<Value> {
    Ok(Value::from(as_str(value, "camelcase")?.to_pascal_case()))
}

fn kebabcase(value: &Value, _args: &Args) -> Result<Value> {
    Ok(Value::from(as_str(value, "kebabcase")?.to_kebab_case()))
}

fn b64enc(value: &Value, _args: &Args) -> Result<Value> {
    Ok(Value::from(STANDARD.encode(as_str(value, "b64enc")?)))
}

fn b64dec(value: &Value, _args: &Args) -> Result<Value> {
    let bytes = STANDARD
        .decode(as_str(value, "b64dec")?)
        .map_err(|e| tera::Error::chain("b64dec filter got invalid base64", e))?;
    let decoded = String::from_utf8(bytes)
        .map_err(|e| tera::Error::chain("b64dec filter decoded non UTF-8 bytes", e))?;
    Ok(Value::from(decoded))
}

fn to_json(value: &Value, _args: &Args) -> Result<Value> {
    serde_json::to_string(value)
        .map(Value::from)
        .map_err(|e| tera::Error::chain("toJson", e))
}

fn to_pretty_json(value: &Value, _args: &Args) -> Result<Value> {
    serde_json::to_string_pretty(value)
        .map(Value::from)
        .map_err(|e| tera::Error::chain("toPrettyJson", e))
}

fn to_string(value: &Value, _args: &Args) -> Result<Value> {
    Ok(Value::from(text(value)))
}

fn empty(value: &Value, _args: &Args) -> Result<Value> {
    Ok(Value::Bool(is_empty(value)))
}

fn ternary(value: &Value, args: &Args) -> Result<Value> {
    let key = if is_empty(value) { "no" } else { "yes" };
    args.get(key)
        .cloned()
        .ok_or_else(|| tera::Error::msg("ternary filter expects `yes` and `no` arguments"))
}

fn has_key(value: &Value, args: &Args) -> Result<Value> {
    let key = str_arg(args, "hasKey", "key")?;
    match value {
        Value::Object(map) => Ok(Value::Bool(map.contains_key(key))),
        _ => Err(tera::Error::msg("hasKey filter expects a map")),
    }
}

fn keys(value: &Value, _args: &Args) -> Result<Value> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            Ok(Value::Array(keys.into_iter().cloned().map(Value::from).collect()))
        }
        _ => Err(tera::Error::msg("keys filter expects a map")),
    }
}

fn uniq(value: &Value, _args: &Args) -> Result<Value> {
    let items = value
        .as_array()
        .ok_or_else(|| tera::Error::msg("uniq filter expects an array"))?;
    let mut seen: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(item) {
            seen.push(item.clone());
        }
    }
    Ok(Value::Array(seen))
}

fn compact(value: &Value, _args: &Args) -> Result<Value> {
    let items = value
        .as_array()
        .ok_or_else(|| tera::Error::msg("compact filter expects an array"))?;
    Ok(Value::Array(
        items.iter().filter(|v| !is_empty(v)).cloned().collect(),
    ))
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value, filter: &str) -> Result<Self> {
        let bad = || tera::Error::msg(format!("{filter} filter expects numbers"));
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Num::Int(i)),
                None => n.as_f64().map(Num::Float).ok_or_else(bad),
            },
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Num::Int)
                .or_else(|_| s.trim().parse::<f64>().map(Num::Float))
                .map_err(|_| bad()),
            _ => Err(bad()),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

fn arith(
    value: &Value,
    args: &Args,
    filter: &str,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> Option<f64>,
) -> Result<Value> {
    let lhs = Num::of(value, filter)?;
    let rhs = args
        .get("n")
        .ok_or_else(|| tera::Error::msg(format!("{filter} filter expects an `n` argument")))
        .and_then(|n| Num::of(n, filter))?;
    let result = match (lhs, rhs) {
        (Num::Int(a), Num::Int(b)) => int_op(a, b).map(Value::from),
        (a, b) => float_op(a.as_f64(), b.as_f64()).map(Value::from),
    };
    result.ok_or_else(|| tera::Error::msg(format!("{filter} filter: invalid operands")))
}

fn add(value: &Value, args: &Args) -> Result<Value> {
    arith(value, args, "add", i64::checked_add, |a, b| Some(a + b))
}

fn sub(value: &Value, args: &Args) -> Result<Value> {
    arith(value, args, "sub", i64::checked_sub, |a, b| Some(a - b))
}

fn mul(value: &Value, args: &Args) -> Result<Value> {
    arith(value, args, "mul", i64::checked_mul, |a, b| Some(a * b))
}

fn div(value: &Value, args: &Args) -> Result<Value> {
    arith(value, args, "div", i64::checked_div, |a, b| {
        (b != 0.0).then(|| a / b)
    })
}

fn modulo(value: &Value, args: &Args) -> Result<Value> {
    arith(value, args, "mod", i64::checked_rem, |a, b| {
        (b != 0.0).then(|| a % b)
    })
}

fn max(value: &Value, args: &Args) -> Result<Value> {
    arith(value, args, "max", |a, b| Some(a.max(b)), |a, b| Some(a.max(b)))
}

fn min(value: &Value, args: &Args) -> Result<Value> {
    arith(value, args, "min", |a, b| Some(a.min(b)), |a, b| Some(a.min(b)))
}

fn dict(args: &Args) -> Result<Value> {
    let map: Map<String, Value> = args.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    Ok(Value::Object(map))
}

fn cat(args: &Args) -> Result<Value> {
    let values = args
        .get("values")
        .and_then(Value::as_array)
        .ok_or_else(|| tera::Error::msg("cat expects a `values` array"))?;
    let sep = args.get("sep").and_then(Value::as_str).unwrap_or(" ");
    Ok(Value::from(
        values
            .iter()
            .filter(|v| !v.is_null())
            .map(text)
            .collect::<Vec<_>>()
            .join(sep),
    ))
}

fn coalesce(args: &Args) -> Result<Value> {
    let values = args
        .get("values")
        .and_then(Value::as_array)
        .ok_or_else(|| tera::Error::msg("coalesce expects a `values` array"))?;
    Ok(values
        .iter()
        .find(|v| !is_empty(v))
        .cloned()
        .unwrap_or(Value::Null))
}

fn uuidv4(_args: &Args) -> Result<Value> {
    Ok(Value::from(uuid::Uuid::new_v4().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Args {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }

    fn render(source: &str, ctx: Value) -> String {
        let mut tera = Tera::default();
        register(&mut tera);
        tera.add_raw_template("t", source).unwrap();
        let ctx = tera::Context::from_value(ctx).unwrap();
        tera.render("t", &ctx).unwrap()
    }

    #[test]
    fn test_trim_filters() {
        let v = json!("views/index.html");
        assert_eq!(trim_prefix(&v, &args(json!({"prefix": "views/"}))).unwrap(), "index.html");
        assert_eq!(trim_suffix(&v, &args(json!({"suffix": ".html"}))).unwrap(), "views/index");
        assert_eq!(trim_all(&json!("$$5$$"), &args(json!({"chars": "$"}))).unwrap(), "5");
    }

    #[test]
    fn test_prefix_suffix_contains() {
        let v = json!("seagull");
        assert_eq!(has_prefix(&v, &args(json!({"prefix": "sea"}))).unwrap(), true);
        assert_eq!(has_suffix(&v, &args(json!({"suffix": "sea"}))).unwrap(), false);
        assert_eq!(contains(&v, &args(json!({"substr": "agu"}))).unwrap(), true);
        assert_eq!(contains(&json!(["a", "b"]), &args(json!({"substr": "b"}))).unwrap(), true);
    }

    #[test]
    fn test_string_shaping() {
        let none = HashMap::new();
        assert_eq!(repeat(&json!("ab"), &args(json!({"count": 3}))).unwrap(), "ababab");
        assert_eq!(nospace(&json!(" a b\tc "), &none).unwrap(), "abc");
        assert_eq!(abbrev(&json!("hello world"), &args(json!({"width": 8}))).unwrap(), "hello...");
        assert_eq!(abbrev(&json!("hi"), &args(json!({"width": 8}))).unwrap(), "hi");
        assert_eq!(initials(&json!("Jonathan Livingston Seagull"), &none).unwrap(), "JLS");
        assert_eq!(untitle(&json!("Hello World"), &none).unwrap(), "hello world");
        assert_eq!(quote(&json!("a\"b"), &none).unwrap(), "\"a\\\"b\"");
        assert_eq!(squote(&json!("ab"), &none).unwrap(), "'ab'");
        assert_eq!(nindent(&json!("a\nb"), &args(json!({"spaces": 2}))).unwrap(), "\n  a\n  b");
    }

    #[test]
    fn test_case_filters() {
        let none = HashMap::new();
        assert_eq!(camelcase(&json!("http_server"), &none).unwrap(), "HttpServer");
        assert_eq!(kebabcase(&json!("HttpServer"), &none).unwrap(), "http-server");
        assert_eq!(snakecase(&json!("HttpServer"), &none).unwrap(), "http_server");
        assert!(snakecase(&json!(42), &none).is_err());
    }

    #[test]
    fn test_base64_round_trip() {
        let enc = b64enc(&json!("seagull"), &HashMap::new()).unwrap();
        assert_eq!(enc, "c2VhZ3VsbA==");
        assert_eq!(b64dec(&enc, &HashMap::new()).unwrap(), "seagull");
        assert!(b64dec(&json!("not base64!"), &HashMap::new()).is_err());
    }

    #[test]
    fn test_data_filters() {
        let m = json!({"b": 1, "a": 2});
        assert_eq!(to_json(&json!([1, "x"]), &HashMap::new()).unwrap(), "[1,\"x\"]");
        assert_eq!(to_string(&json!(5), &HashMap::new()).unwrap(), "5");
        assert_eq!(empty(&json!(""), &HashMap::new()).unwrap(), true);
        assert_eq!(empty(&json!([0]), &HashMap::new()).unwrap(), false);
        assert_eq!(has_key(&m, &args(json!({"key": "a"}))).unwrap(), true);
        assert_eq!(keys(&m, &HashMap::new()).unwrap(), json!(["a", "b"]));
        assert_eq!(uniq(&json!([1, 2, 1, 3]), &HashMap::new()).unwrap(), json!([1, 2, 3]));
        assert_eq!(compact(&json!(["a", "", null, 0, "b"]), &HashMap::new()).unwrap(), json!(["a", "b"]));
        let pick = args(json!({"yes": "on", "no": "off"}));
        assert_eq!(ternary(&json!(true), &pick).unwrap(), "on");
        assert_eq!(ternary(&json!(false), &pick).unwrap(), "off");
    }

    #[test]
    fn test_math_filters() {
        let n = |v: Value| args(json!({ "n": v }));
        assert_eq!(add(&json!(2), &n(json!(3))).unwrap(), json!(5));
        assert_eq!(sub(&json!(2), &n(json!(3))).unwrap(), json!(-1));
        assert_eq!(mul(&json!("4"), &n(json!(2))).unwrap(), json!(8));
        assert_eq!(div(&json!(7), &n(json!(2))).unwrap(), json!(3));
        assert_eq!(div(&json!(7.0), &n(json!(2))).unwrap(), json!(3.5));
        assert_eq!(modulo(&json!(7), &n(json!(4))).unwrap(), json!(3));
        assert_eq!(max(&json!(7), &n(json!(4))).unwrap(), json!(7));
        assert_eq!(min(&json!(7), &n(json!(4))).unwrap(), json!(4));
        assert!(div(&json!(1), &n(json!(0))).is_err());
        assert!(add(&json!("x"), &n(json!(1))).is_err());
    }

    #[test]
    fn test_functions() {
        let d = dict(&args(json!({"title": "t", "n": 1}))).unwrap();
        assert_eq!(d, json!({"title": "t", "n": 1}));
        assert_eq!(cat(&args(json!({"values": ["a", null, 1]}))).unwrap(), "a 1");
        assert_eq!(cat(&args(json!({"values": ["a", "b"], "sep": "-"}))).unwrap(), "a-b");
        assert_eq!(coalesce(&args(json!({"values": [null, "", "x"]}))).unwrap(), "x");
        let id = uuidv4(&HashMap::new()).unwrap();
        assert_eq!(id.as_str().unwrap().len(), 36);
    }

    #[test]
    fn test_registered_in_tera() {
        let out = render(
            "{{ path | trimPrefix(prefix=\"/\") | upper }} {{ count | add(n=1) }} {{ dict(a=1) | toJson }}",
            json!({"path": "/quote", "count": 41}),
        );
        assert_eq!(out, "QUOTE 42 {\"a\":1}");
    }
}
