//! HTML character reference decoding.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENCODED_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r"&(?:lt|gt|quot|amp|#39);").unwrap());
static ENCODED_ATTR_WITH_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:lt|gt|quot|amp|#39|#10|#9);").unwrap());
static CHARACTER_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:#[xX]([0-9a-fA-F]+)|#([0-9]+)|([a-zA-Z][a-zA-Z0-9]*));").unwrap());

/// Decodes the references an attribute value may legitimately carry.
///
/// `&#10;` and `&#9;` are only decoded when `newlines` is set; some browsers
/// encode newlines inside attribute values and others do not.
pub fn decode_attr(value: &str, newlines: bool) -> Cow<'_, str> {
    let re: &Regex = if newlines {
        &*ENCODED_ATTR_WITH_NEWLINES
    } else {
        &*ENCODED_ATTR
    };
    re.replace_all(value, |caps: &Captures<'_>| {
        match &caps[0] {
            "&lt;" => "<",
            "&gt;" => ">",
            "&quot;" => "\"",
            "&amp;" => "&",
            "&#39;" => "'",
            "&#10;" => "\n",
            "&#9;" => "\t",
            other => other,
        }
        .to_string()
    })
}

/// Decodes numeric references and the common named references in text.
///
/// Unknown names are left untouched.
pub fn decode_text(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    CHARACTER_REFERENCE.replace_all(text, |caps: &Captures<'_>| {
        let decoded = if let Some(hex) = caps.get(1) {
            u32::from_str_radix(hex.as_str(), 16).ok().map(code_point)
        } else if let Some(dec) = caps.get(2) {
            dec.as_str().parse::<u32>().ok().map(code_point)
        } else {
            caps.get(3).and_then(|name| named(name.as_str())).map(String::from)
        };
        decoded.unwrap_or_else(|| caps[0].to_string())
    })
}

fn code_point(value: u32) -> String {
    char::from_u32(value)
        .filter(|&c| c != '\0')
        .unwrap_or('\u{FFFD}')
        .to_string()
}

fn named(name: &str) -> Option<&'static str> {
    Some(match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{A0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "zwnj" => "\u{200C}",
        "zwj" => "\u{200D}",
        "shy" => "\u{AD}",
        "copy" => "\u{A9}",
        "reg" => "\u{AE}",
        "trade" => "\u{2122}",
        "hellip" => "\u{2026}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "laquo" => "\u{AB}",
        "raquo" => "\u{BB}",
        "bull" => "\u{2022}",
        "middot" => "\u{B7}",
        "deg" => "\u{B0}",
        "plusmn" => "\u{B1}",
        "times" => "\u{D7}",
        "divide" => "\u{F7}",
        "cent" => "\u{A2}",
        "pound" => "\u{A3}",
        "euro" => "\u{20AC}",
        "yen" => "\u{A5}",
        "sect" => "\u{A7}",
        "para" => "\u{B6}",
        "larr" => "\u{2190}",
        "uarr" => "\u{2191}",
        "rarr" => "\u{2192}",
        "darr" => "\u{2193}",
        "hearts" => "\u{2665}",
        _ => return None,
    })
}
