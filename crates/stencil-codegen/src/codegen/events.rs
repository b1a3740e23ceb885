//! Event handler code.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use stencil_parser::ast::Handler;
use stencil_parser::util::stringify;

static FN_EXP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\w$]+|\([^)]*?\))\s*=>|^function(?:\s+[\w$]+)?\s*\(").unwrap()
});
static FN_INVOKE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*?\);*$").unwrap());
static SIMPLE_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*|\['[^']*?'\]|\["[^"]*?"\]|\[\d+\]|\[[A-Za-z_$][\w$]*\])*$"#,
    )
    .unwrap()
});

/// Key codes of the named key modifiers.
pub fn key_code(key: &str) -> Option<&'static str> {
    Some(match key {
        "esc" => "27",
        "tab" => "9",
        "enter" => "13",
        "space" => "32",
        "up" => "38",
        "left" => "37",
        "right" => "39",
        "down" => "40",
        "delete" => "[8,46]",
        _ => return None,
    })
}

/// `KeyboardEvent.key` values of the named key modifiers.
pub fn key_name(key: &str) -> Option<&'static str> {
    Some(match key {
        "esc" => r#"["Esc","Escape"]"#,
        "tab" => r#""Tab""#,
        "enter" => r#""Enter""#,
        "space" => r#"[" ","Spacebar"]"#,
        "up" => r#"["Up","ArrowUp"]"#,
        "left" => r#"["Left","ArrowLeft"]"#,
        "right" => r#"["Right","ArrowRight"]"#,
        "down" => r#"["Down","ArrowDown"]"#,
        "delete" => r#"["Backspace","Delete","Del"]"#,
        _ => return None,
    })
}

fn guard(condition: &str) -> String {
    format!("if({condition})return null;")
}

/// Statement emitted for a modifier that is not a key name.
pub fn modifier_code(modifier: &str) -> Option<String> {
    Some(match modifier {
        "stop" => "$event.stopPropagation();".to_string(),
        "prevent" => "$event.preventDefault();".to_string(),
        "self" => guard("$event.target !== $event.currentTarget"),
        "ctrl" => guard("!$event.ctrlKey"),
        "shift" => guard("!$event.shiftKey"),
        "alt" => guard("!$event.altKey"),
        "meta" => guard("!$event.metaKey"),
        "left" => guard("'button' in $event && $event.button !== 0"),
        "middle" => guard("'button' in $event && $event.button !== 1"),
        "right" => guard("'button' in $event && $event.button !== 2"),
        _ => return None,
    })
}

/// Generates the `on:` or `nativeOn:` entry of a data object.
pub fn gen_handlers(events: &IndexMap<String, Vec<Handler>>, native: bool) -> String {
    let prefix = if native { "nativeOn:" } else { "on:" };
    let mut static_handlers = Vec::new();
    let mut dynamic_handlers = Vec::new();
    for (name, handlers) in events {
        let code = gen_handler_list(handlers);
        // A list of handlers is always keyed statically.
        if matches!(handlers.as_slice(), [handler] if handler.dynamic) {
            dynamic_handlers.push(format!("{name},{code}"));
        } else {
            static_handlers.push(format!("\"{name}\":{code}"));
        }
    }
    let static_handlers = format!("{{{}}}", static_handlers.join(","));
    if dynamic_handlers.is_empty() {
        format!("{prefix}{static_handlers}")
    } else {
        format!("{prefix}_d({static_handlers},[{}])", dynamic_handlers.join(","))
    }
}

fn gen_handler_list(handlers: &[Handler]) -> String {
    match handlers {
        [] => "function(){}".to_string(),
        [handler] => gen_handler(handler),
        _ => {
            let all: Vec<String> = handlers.iter().map(gen_handler).collect();
            format!("[{}]", all.join(","))
        }
    }
}

/// Generates one handler function.
///
/// Without modifiers, method paths and function expressions are emitted as
/// they are and anything else becomes the body of `function($event){...}`.
pub fn gen_handler(handler: &Handler) -> String {
    let value = handler.value.as_str();
    let is_method_path = SIMPLE_PATH_RE.is_match(value);
    let is_function_expression = FN_EXP_RE.is_match(value);
    let is_function_invocation = SIMPLE_PATH_RE.is_match(&FN_INVOKE_RE.replace(value, ""));

    let Some(modifiers) = &handler.modifiers else {
        if is_method_path || is_function_expression {
            return value.to_string();
        }
        let body = if is_function_invocation {
            format!("return {value}")
        } else {
            value.to_string()
        };
        return format!("function($event){{{body}}}");
    };

    let mut modifier_statements = String::new();
    let mut keys = Vec::new();
    for modifier in modifiers {
        if let Some(code) = modifier_code(modifier) {
            modifier_statements.push_str(&code);
            if key_code(modifier).is_some() {
                keys.push(modifier.as_str());
            }
        } else if modifier == "exact" {
            let pressed: Vec<String> = ["ctrl", "shift", "alt", "meta"]
                .iter()
                .filter(|key| !modifiers.contains(**key))
                .map(|key| format!("$event.{key}Key"))
                .collect();
            modifier_statements.push_str(&guard(&pressed.join("||")));
        } else {
            keys.push(modifier.as_str());
        }
    }

    let mut code = String::new();
    if !keys.is_empty() {
        code.push_str(&gen_key_filter(&keys));
    }
    code.push_str(&modifier_statements);

    let body = if is_method_path {
        format!("return {value}.apply(null, arguments)")
    } else if is_function_expression {
        format!("return ({value}).apply(null, arguments)")
    } else if is_function_invocation {
        format!("return {value}")
    } else {
        value.to_string()
    };
    format!("function($event){{{code}{body}}}")
}

fn gen_key_filter(keys: &[&str]) -> String {
    let filters: Vec<String> = keys.iter().map(|key| gen_filter_code(key)).collect();
    format!(
        "if(!$event.type.indexOf('key')&&{})return null;",
        filters.join("&&")
    )
}

fn gen_filter_code(key: &str) -> String {
    if let Some(code) = parse_int_prefix(key).filter(|&code| code != 0) {
        return format!("$event.keyCode!=={code}");
    }
    format!(
        "_k($event.keyCode,{},{},$event.key,{})",
        stringify(key),
        key_code(key).unwrap_or("undefined"),
        key_name(key).unwrap_or("undefined"),
    )
}

/// Reads a leading base-10 integer the way `parseInt(key, 10)` does:
/// optional leading whitespace and sign, then as many digits as are present.
/// Values that do not fit in an `i64` are treated as not numeric.
fn parse_int_prefix(key: &str) -> Option<i64> {
    let rest = key.trim_start();
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };
    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let value: i64 = rest[..len].parse().ok()?;
    Some(if negative { -value } else { value })
}
