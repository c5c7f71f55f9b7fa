// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::fmt::Write;
use std::iter::Peekable;
use std::str::Chars;

use crate::Value;

// widths and precisions above this render as `%!(BADWIDTH)` / `%!(BADPREC)`
const MAX_WIDTH_OR_PRECISION: usize = 1_000_000;
// std formatting rejects float precisions above u16::MAX
const MAX_FLOAT_PRECISION: usize = u16::MAX as usize;

/// Renders a printf-style template with positional arguments.
///
/// A directive has the shape `%[flags][width][.precision]verb`, with flags from `-+# 0`.
///
/// | Verb | Arguments | Output |
/// |---|---|---|
/// | `%%` | none | a literal `%` |
/// | `%v`, `%s` | any | default representation |
/// | `%q` | strings, chars, integers that are valid chars | a quoted, escaped literal |
/// | `%d`, `%b`, `%o`, `%x`, `%X` | integers and chars | base 10, 2, 8 or 16 digits |
/// | `%x`, `%X` | strings | hex of the UTF-8 bytes |
/// | `%c` | chars, integers that are valid chars | the character |
/// | `%t` | booleans | `true` or `false` |
/// | `%f`, `%e`, `%E`, `%g`, `%G` | floats | fixed, exponent or shortest notation |
///
/// `%v` and `%g` without a precision print the shortest representation that round-trips,
/// switching to exponent notation when the decimal exponent is below -4 or at least 21, so
/// `1e21` renders as `1e+21`. Float precision is capped at 65535 digits.
///
/// Rendering never fails. A missing argument renders as `%!d(MISSING)`, an argument the verb
/// cannot print renders as `%!d(str=text)`, a template ending inside a directive renders
/// `%!(NOVERB)`, and unused arguments are listed at the end as `%!(EXTRA i64=1, str=x)`. A width
/// or precision above 1000000 renders as `%!(BADWIDTH)` or `%!(BADPREC)` and is then ignored.
///
/// # Examples
///
/// ```
/// use logwriter::Value;
/// use logwriter::format::Printf;
///
/// let args = [Value::from("world"), Value::from(2024)];
/// let line = Printf::new("Hello, %s %d!\n", &args).to_string();
/// assert_eq!(line, "Hello, world 2024!\n");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Printf<'a, 'v> {
    format: &'a str,
    args: &'a [Value<'v>],
}

impl<'a, 'v> Printf<'a, 'v> {
    /// Creates a new [`Printf`] for the given template and arguments.
    pub fn new(format: &'a str, args: &'a [Value<'v>]) -> Self {
        Self { format, args }
    }
}

impl fmt::Display for Printf<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_printf(f, self.format, self.args)
    }
}

/// Writes `format` with `args` substituted into `w`. See [`Printf`] for the directive syntax.
pub fn write_printf<W>(w: &mut W, format: &str, args: &[Value<'_>]) -> fmt::Result
where
    W: Write + ?Sized,
{
    let mut chars = format.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            w.write_char(c)?;
            continue;
        }

        let mut spec = Spec::parse(&mut chars);
        if spec.width.is_some_and(|width| width > MAX_WIDTH_OR_PRECISION) {
            w.write_str("%!(BADWIDTH)")?;
            spec.width = None;
        }
        if spec
            .precision
            .is_some_and(|precision| precision > MAX_WIDTH_OR_PRECISION)
        {
            w.write_str("%!(BADPREC)")?;
            spec.precision = None;
        }
        let Some(verb) = chars.next() else {
            w.write_str("%!(NOVERB)")?;
            break;
        };
        if verb == '%' {
            w.write_char('%')?;
            continue;
        }
        spec.verb = verb;

        match args.get(next_arg) {
            Some(arg) => {
                next_arg += 1;
                format_arg(w, arg, &spec)?;
            }
            None => write!(w, "%!{verb}(MISSING)")?,
        }
    }

    if let Some(extra) = args.get(next_arg..).filter(|extra| !extra.is_empty()) {
        w.write_str("%!(EXTRA ")?;
        for (i, arg) in extra.iter().enumerate() {
            if i > 0 {
                w.write_str(", ")?;
            }
            write!(w, "{}={arg}", arg.type_name())?;
        }
        w.write_char(')')?;
    }

    Ok(())
}

#[derive(Debug, Default)]
struct Spec {
    minus: bool,
    plus: bool,
    sharp: bool,
    space: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
    verb: char,
}

impl Spec {
    fn parse(chars: &mut Peekable<Chars<'_>>) -> Spec {
        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.minus = true,
                '+' => spec.plus = true,
                '#' => spec.sharp = true,
                ' ' => spec.space = true,
                '0' => spec.zero = true,
                _ => break,
            }
            chars.next();
        }
        spec.width = parse_number(chars);
        if chars.next_if_eq(&'.').is_some() {
            spec.precision = Some(parse_number(chars).unwrap_or(0));
        }
        spec
    }

    fn sign(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        }
    }
}

fn parse_number(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut number = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        let n: usize = number.unwrap_or(0);
        number = Some(n.saturating_mul(10).saturating_add(digit as usize));
    }
    number
}

fn format_arg<W>(w: &mut W, arg: &Value<'_>, spec: &Spec) -> fmt::Result
where
    W: Write + ?Sized,
{
    match (spec.verb, *arg) {
        ('v', Value::I64(n)) => format_signed(w, n, spec),
        ('v', Value::U64(n)) => format_integer(w, false, n, spec),
        ('v', Value::F64(n)) => format_float(w, n, spec),
        ('v' | 's', _) => pad(w, truncate(&arg.to_string(), spec.precision), spec),

        ('q', Value::Str(s)) => pad(w, &format!("{:?}", truncate(s, spec.precision)), spec),
        ('q', Value::Display(d)) => {
            let s = d.to_string();
            pad(w, &format!("{:?}", truncate(&s, spec.precision)), spec)
        }
        ('q', _) => match as_char(arg) {
            Some(c) => pad(w, &format!("{c:?}"), spec),
            None => bad_verb(w, arg, spec),
        },
        ('c', _) => match as_char(arg) {
            Some(c) => pad(w, c.encode_utf8(&mut [0; 4]), spec),
            None => bad_verb(w, arg, spec),
        },
        ('t', Value::Bool(b)) => pad(w, if b { "true" } else { "false" }, spec),

        ('d' | 'b' | 'o' | 'x' | 'X', Value::I64(n)) => format_signed(w, n, spec),
        ('d' | 'b' | 'o' | 'x' | 'X', Value::U64(n)) => format_integer(w, false, n, spec),
        ('d' | 'b' | 'o' | 'x' | 'X', Value::Char(c)) => {
            format_integer(w, false, u64::from(u32::from(c)), spec)
        }
        ('x' | 'X', Value::Str(s)) => format_hex_bytes(w, s.as_bytes(), spec),
        ('x' | 'X', Value::Display(d)) => format_hex_bytes(w, d.to_string().as_bytes(), spec),

        ('f' | 'F' | 'e' | 'E' | 'g' | 'G', Value::F64(n)) => format_float(w, n, spec),

        _ => bad_verb(w, arg, spec),
    }
}

fn bad_verb<W>(w: &mut W, arg: &Value<'_>, spec: &Spec) -> fmt::Result
where
    W: Write + ?Sized,
{
    write!(w, "%!{}({}={arg})", spec.verb, arg.type_name())
}

fn as_char(arg: &Value<'_>) -> Option<char> {
    match *arg {
        Value::Char(c) => Some(c),
        Value::I64(n) => u32::try_from(n).ok().and_then(char::from_u32),
        Value::U64(n) => u32::try_from(n).ok().and_then(char::from_u32),
        _ => None,
    }
}

fn truncate(s: &str, precision: Option<usize>) -> &str {
    match precision.and_then(|p| s.char_indices().nth(p)) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

fn fill<W>(w: &mut W, n: usize, c: char) -> fmt::Result
where
    W: Write + ?Sized,
{
    for _ in 0..n {
        w.write_char(c)?;
    }
    Ok(())
}

fn pad<W>(w: &mut W, s: &str, spec: &Spec) -> fmt::Result
where
    W: Write + ?Sized,
{
    let n = spec.width.unwrap_or(0).saturating_sub(s.chars().count());
    if spec.minus {
        w.write_str(s)?;
        fill(w, n, ' ')
    } else {
        fill(w, n, ' ')?;
        w.write_str(s)
    }
}

fn pad_number<W>(
    w: &mut W,
    sign: &str,
    prefix: &str,
    digits: &str,
    spec: &Spec,
    zero_padding: bool,
) -> fmt::Result
where
    W: Write + ?Sized,
{
    let len = sign.len() + prefix.len() + digits.chars().count();
    let n = spec.width.unwrap_or(0).saturating_sub(len);
    if spec.minus {
        w.write_str(sign)?;
        w.write_str(prefix)?;
        w.write_str(digits)?;
        fill(w, n, ' ')
    } else if spec.zero && zero_padding {
        w.write_str(sign)?;
        w.write_str(prefix)?;
        fill(w, n, '0')?;
        w.write_str(digits)
    } else {
        fill(w, n, ' ')?;
        w.write_str(sign)?;
        w.write_str(prefix)?;
        w.write_str(digits)
    }
}

fn format_signed<W>(w: &mut W, n: i64, spec: &Spec) -> fmt::Result
where
    W: Write + ?Sized,
{
    format_integer(w, n < 0, n.unsigned_abs(), spec)
}

fn format_integer<W>(w: &mut W, negative: bool, magnitude: u64, spec: &Spec) -> fmt::Result
where
    W: Write + ?Sized,
{
    let mut digits = match spec.verb {
        'b' => format!("{magnitude:b}"),
        'o' => format!("{magnitude:o}"),
        'x' => format!("{magnitude:x}"),
        'X' => format!("{magnitude:X}"),
        _ => magnitude.to_string(),
    };

    // precision is the minimum number of digits
    if let Some(precision) = spec.precision {
        if precision == 0 && magnitude == 0 {
            digits.clear();
        } else if digits.len() < precision {
            digits.insert_str(0, &"0".repeat(precision - digits.len()));
        }
    }

    let prefix = match spec.verb {
        'b' if spec.sharp => "0b",
        'o' if spec.sharp && !digits.starts_with('0') => "0",
        'x' if spec.sharp => "0x",
        'X' if spec.sharp => "0X",
        _ => "",
    };

    let sign = spec.sign(negative);
    pad_number(w, sign, prefix, &digits, spec, spec.precision.is_none())
}

fn format_hex_bytes<W>(w: &mut W, bytes: &[u8], spec: &Spec) -> fmt::Result
where
    W: Write + ?Sized,
{
    let upper = spec.verb == 'X';
    let mut digits = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        if upper {
            write!(digits, "{b:02X}")?;
        } else {
            write!(digits, "{b:02x}")?;
        }
    }

    let prefix = match (spec.sharp, upper) {
        (true, false) => "0x",
        (true, true) => "0X",
        (false, _) => "",
    };
    pad_number(w, "", prefix, &digits, spec, false)
}

fn format_float<W>(w: &mut W, n: f64, spec: &Spec) -> fmt::Result
where
    W: Write + ?Sized,
{
    if n.is_nan() {
        return pad_number(w, spec.sign(false), "", "NaN", spec, false);
    }

    let negative = n.is_sign_negative();
    if n.is_infinite() {
        let sign = if negative { "-" } else { "+" };
        return pad_number(w, sign, "", "Inf", spec, false);
    }

    let abs = n.abs();
    let upper = matches!(spec.verb, 'E' | 'G');
    let precision = spec.precision.map(|p| p.min(MAX_FLOAT_PRECISION));
    let digits = match spec.verb {
        'f' | 'F' => format!("{:.*}", precision.unwrap_or(6), abs),
        'e' | 'E' => exponent_notation(abs, precision.unwrap_or(6), upper),
        _ => match precision {
            Some(precision) => general_notation(abs, precision, upper),
            None => shortest_notation(abs, upper),
        },
    };

    pad_number(w, spec.sign(negative), "", &digits, spec, true)
}

/// Splits Rust's `LowerExp` output into mantissa and exponent.
fn split_exponent(formatted: &str) -> (&str, i32) {
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse().unwrap_or(0)),
        None => (formatted, 0),
    }
}

fn with_exponent(mantissa: &str, exponent: i32, upper: bool) -> String {
    let e = if upper { 'E' } else { 'e' };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}{e}{sign}{:02}", exponent.unsigned_abs())
}

fn exponent_notation(abs: f64, precision: usize, upper: bool) -> String {
    let formatted = format!("{:.*e}", precision, abs);
    let (mantissa, exponent) = split_exponent(&formatted);
    with_exponent(mantissa, exponent, upper)
}

fn shortest_notation(abs: f64, upper: bool) -> String {
    if abs == 0.0 {
        return "0".to_string();
    }

    let formatted = format!("{abs:e}");
    let (mantissa, exponent) = split_exponent(&formatted);
    if !(-4..21).contains(&exponent) {
        with_exponent(mantissa, exponent, upper)
    } else {
        abs.to_string()
    }
}

/// `precision` significant digits, switching to exponent notation for very small or large
/// magnitudes. Trailing zeros are dropped.
fn general_notation(abs: f64, precision: usize, upper: bool) -> String {
    if abs == 0.0 {
        return "0".to_string();
    }

    let precision = precision.max(1);
    let formatted = format!("{:.*e}", precision - 1, abs);
    let (mantissa, exponent) = split_exponent(&formatted);
    let significant = i32::try_from(precision).unwrap_or(i32::MAX);
    if exponent < -4 || exponent >= significant {
        with_exponent(trim_fraction(mantissa), exponent, upper)
    } else {
        let decimals = usize::try_from(significant - 1 - exponent)
            .unwrap_or(0)
            .min(MAX_FLOAT_PRECISION);
        trim_fraction(&format!("{:.*}", decimals, abs)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printf(format: &str, args: &[Value]) -> String {
        Printf::new(format, args).to_string()
    }

    #[test]
    fn test_string_and_integer_verbs() {
        assert_eq!(
            printf("Hello, %s %d!\n", &["world".into(), 2024.into()]),
            "Hello, world 2024!\n"
        );
        assert_eq!(printf("%v %v %v", &[1.into(), "a".into(), true.into()]), "1 a true");
        assert_eq!(printf("no directives", &[]), "no directives");
        assert_eq!(printf("100%%", &[]), "100%");
    }

    #[test]
    fn test_width_flags_and_precision() {
        assert_eq!(
            printf("%5d|%-5d|%05d", &[42.into(), 42.into(), (-42).into()]),
            "   42|42   |-0042"
        );
        assert_eq!(printf("%+d % d", &[5.into(), 5.into()]), "+5  5");
        assert_eq!(printf("%.3d|%.0d|", &[7.into(), 0.into()]), "007||");
        assert_eq!(
            printf("%.3s|%6s|%-6s|", &["abcdef".into(), "ab".into(), "ab".into()]),
            "abc|    ab|ab    |"
        );
        assert_eq!(printf("%-4s|%3c|", &["é".into(), 'ß'.into()]), "é   |  ß|");
    }

    #[test]
    fn test_integer_bases() {
        let args: [Value; 7] = [
            255.into(),
            255.into(),
            255.into(),
            8.into(),
            8.into(),
            5.into(),
            5.into(),
        ];
        assert_eq!(
            printf("%x %X %#x %o %#o %b %#b", &args),
            "ff FF 0xff 10 010 101 0b101"
        );
        assert_eq!(printf("%x", &[(-255).into()]), "-ff");
        assert_eq!(printf("%d", &[u64::MAX.into()]), "18446744073709551615");
        assert_eq!(printf("%d %x", &['A'.into(), 'A'.into()]), "65 41");
    }

    #[test]
    fn test_hex_of_strings() {
        let args: [Value; 3] = ["hi".into(), "hi".into(), "hi".into()];
        assert_eq!(printf("%x %X %#x", &args), "6869 6869 0x6869");
    }

    #[test]
    fn test_chars_quotes_and_bools() {
        assert_eq!(printf("%c%c", &['R'.into(), 117.into()]), "Ru");
        assert_eq!(printf("%q %q", &["hi\n".into(), 'x'.into()]), "\"hi\\n\" 'x'");
        assert_eq!(printf("%t %t", &[true.into(), false.into()]), "true false");
    }

    #[test]
    fn test_float_verbs() {
        assert_eq!(
            printf("%.2f %e %E", &[1.23456.into(), 1234.5678.into(), 0.00012.into()]),
            "1.23 1.234568e+03 1.200000E-04"
        );
        assert_eq!(printf("%f", &[1.5.into()]), "1.500000");
        assert_eq!(printf("%08.3f", &[(-1.23456).into()]), "-001.235");
        assert_eq!(printf("%+.1f", &[2.0.into()]), "+2.0");
        assert_eq!(printf("%v %g", &[0.5.into(), 0.25.into()]), "0.5 0.25");
        let args: [Value; 4] = [
            1234.5678.into(),
            1.23456.into(),
            0.0001234.into(),
            1234.5678.into(),
        ];
        assert_eq!(
            printf("%.3g %.3g %.2g %.3G", &args),
            "1.23e+03 1.23 0.00012 1.23E+03"
        );
        assert_eq!(printf("%.3g %.2g", &[100.0.into(), 9.99.into()]), "100 10");
    }

    #[test]
    fn test_shortest_floats_switch_to_exponent() {
        let args: [Value; 5] = [
            1e21.into(),
            1e20.into(),
            0.00001.into(),
            1.5e-7.into(),
            0.0001.into(),
        ];
        assert_eq!(
            printf("%g %v %g %G %v", &args),
            "1e+21 100000000000000000000 1e-05 1.5E-07 0.0001"
        );
        assert_eq!(printf("%v|%8g|", &[0.0.into(), (-1e21).into()]), "0|  -1e+21|");
    }

    #[test]
    fn test_huge_float_precision_is_clamped() {
        let out = printf("%.70000e", &[1.5.into()]);
        assert!(out.starts_with("1.5000"));
        assert!(out.ends_with("e+00"));
        assert_eq!(out.len(), 2 + 65535 + 4);

        assert_eq!(printf("%.70000g", &[1.5.into()]), "1.5");
        assert_eq!(printf("%.70000f", &[0.5.into()]).len(), 2 + 65535);
    }

    #[test]
    fn test_out_of_range_width_and_precision() {
        assert_eq!(printf("%.3000000000f", &[1.5.into()]), "%!(BADPREC)1.500000");
        assert_eq!(printf("%99999999999999999999d", &[1.into()]), "%!(BADWIDTH)1");
        assert_eq!(
            printf("%1000001.1000001d|", &[7.into()]),
            "%!(BADWIDTH)%!(BADPREC)7|"
        );
        assert_eq!(printf("%.2000000s", &["abc".into()]), "%!(BADPREC)abc");
        assert_eq!(printf("%1000000d", &[1.into()]).len(), 1_000_000);
    }

    #[test]
    fn test_non_finite_floats() {
        let args: [Value; 3] = [f64::NAN.into(), f64::INFINITY.into(), f64::NEG_INFINITY.into()];
        assert_eq!(printf("%f %f %f", &args), "NaN +Inf -Inf");
        assert_eq!(printf("%05f|", &[f64::INFINITY.into()]), " +Inf|");
    }

    #[test]
    fn test_mistakes_render_in_band() {
        assert_eq!(printf("%d %d", &[1.into()]), "1 %!d(MISSING)");
        assert_eq!(printf("%d", &["x".into()]), "%!d(str=x)");
        assert_eq!(printf("%t", &[1.into()]), "%!t(i64=1)");
        assert_eq!(printf("%f", &[1.into()]), "%!f(i64=1)");
        assert_eq!(printf("%z", &[true.into()]), "%!z(bool=true)");
        assert_eq!(
            printf("%d", &[1.into(), "x".into(), 2.5.into()]),
            "1%!(EXTRA str=x, f64=2.5)"
        );
        assert_eq!(printf("trailing %", &[]), "trailing %!(NOVERB)");
        assert_eq!(printf("trailing %-5", &[]), "trailing %!(NOVERB)");
    }

    #[test]
    fn test_display_values() {
        let addr = std::net::Ipv4Addr::new(10, 0, 0, 1);
        let args = [Value::display(&addr), Value::display(&addr)];
        assert_eq!(printf("[%s] %q", &args), "[10.0.0.1] \"10.0.0.1\"");
        assert_eq!(printf("%d", &[Value::display(&addr)]), "%!d(display=10.0.0.1)");
    }

    #[test]
    fn test_write_printf_into_string() {
        let mut out = String::from("> ");
        write_printf(&mut out, "%s=%d", &["retries".into(), 3.into()]).unwrap();
        assert_eq!(out, "> retries=3");
    }
}
