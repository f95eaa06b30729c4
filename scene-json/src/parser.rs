use crate::error::JsonError;
use crate::location::SourceLocation;
use crate::value::{JsonObject, JsonString, Number, Value};

struct State<'a> {
    bytes: &'a [u8],
    point: usize,
    location: SourceLocation,
}

fn is_ws(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

impl<'a> State<'a> {
    fn new(file: &str, input: &'a [u8]) -> Self {
        Self {
            bytes: input,
            point: 0,
            location: SourceLocation::start(file.to_string()),
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.point
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.point).copied()
    }

    fn next(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.point += 1;
        self.location.advance(c);
        Some(c)
    }

    fn skip_whitespace(&mut self) -> bool {
        while let Some(c) = self.peek() {
            if !is_ws(c) {
                break;
            }
            self.next();
        }
        self.point < self.bytes.len()
    }

    fn err(&self, message: impl Into<String>) -> JsonError {
        JsonError::new(self.location.clone(), message)
    }
}

fn parse_hex_char(state: &mut State) -> Result<u8, JsonError> {
    if state.remaining() < 2 {
        return Err(state.err("too few characters remain to read a hex byte"));
    }
    let hi = state.next().unwrap();
    let lo = state.next().unwrap();
    let digit = |c: u8| -> Result<u8, ()> {
        match c {
            b'0'..=b'9' => Ok(c - b'0'),
            b'A'..=b'F' => Ok(10 + c - b'A'),
            b'a'..=b'f' => Ok(10 + c - b'a'),
            _ => Err(()),
        }
    };
    let (hi, lo) = (digit(hi), digit(lo));
    match (hi, lo) {
        (Ok(hi), Ok(lo)) => Ok(16 * hi + lo),
        _ => Err(state.err("attempted to interpret non-hex characters as hex")),
    }
}

fn parse_string(state: &mut State) -> Result<JsonString, JsonError> {
    if state.next() != Some(b'"') {
        return Err(state.err("expected a string"));
    }

    let mut result = Vec::new();
    let mut escape = false;

    while state.point < state.bytes.len() {
        let c = state.next().unwrap();
        if escape {
            match c {
                b'"' | b'\\' | b'/' => result.push(c),
                b'b' => result.push(0x08),
                b'f' => result.push(0x0c),
                b'n' => result.push(b'\n'),
                b'r' => result.push(b'\r'),
                b't' => result.push(b'\t'),
                b'u' => {
                    if state.remaining() < 4 {
                        return Err(state.err(
                            "started a unicode sequence with fewer than four characters remaining",
                        ));
                    }
                    result.push(parse_hex_char(state)?);
                    result.push(parse_hex_char(state)?);
                }
                _ => return Err(state.err("invalid escape character")),
            }
            escape = false;
            continue;
        }
        if c == b'\\' {
            escape = true;
            continue;
        }
        if c == b'"' {
            return Ok(JsonString(result));
        }
        result.push(c);
    }

    Err(state.err("input ended while parsing string"))
}

/// Parses a leading-zero numeric token as a run of octal digits only,
/// stopping at the first non-octal byte without continuing into a
/// fractional part or exponent even if one follows.
fn parse_octal(state: &mut State) -> Result<Number, JsonError> {
    if state.next() != Some(b'0') {
        return Err(state.err("expected an octal number"));
    }

    let mut result: i64 = 0;
    while let Some(c) = state.peek() {
        if !(b'0'..b'8').contains(&c) {
            break;
        }
        state.next();
        result = (c - b'0') as i64 + result * 8;
    }

    Ok(Number::Int(result))
}

fn parse_digits(state: &mut State) -> u64 {
    let mut result: u64 = 0;
    while let Some(c) = state.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        state.next();
        result = (c - b'0') as u64 + result * 10;
    }
    result
}

fn parse_fraction(state: &mut State) -> f64 {
    let start = state.point;
    let numerator = parse_digits(state);
    let digit_count = state.point - start;

    let mut denominator: f64 = 1.0;
    for _ in 0..digit_count {
        denominator *= 10.0;
    }

    numerator as f64 / denominator
}

fn parse_number(state: &mut State) -> Result<Number, JsonError> {
    let is_negative = state.peek() == Some(b'-');
    if is_negative {
        state.next();
    }

    let mut result = Number::Int(parse_digits(state) as i64);

    if state.peek() == Some(b'.') {
        state.next();
        let frac = parse_fraction(state);
        result = Number::Float(result.as_float() + frac);
    }

    if matches!(state.peek(), Some(b'e') | Some(b'E')) {
        state.next();
        let sign_negative = match state.peek() {
            Some(b'-') => {
                state.next();
                true
            }
            Some(b'+') => {
                state.next();
                false
            }
            _ => false,
        };
        let mut exponent = parse_digits(state);
        let mut value = result.as_float();
        if sign_negative {
            while exponent > 0 {
                value /= 10.0;
                exponent -= 1;
            }
        } else {
            while exponent > 0 {
                value *= 10.0;
                exponent -= 1;
            }
        }
        result = Number::Float(value);
    }

    if is_negative {
        result = match result {
            Number::Int(i) => Number::Int(-i),
            Number::Float(f) => Number::Float(-f),
        };
    }

    Ok(result)
}

fn parse_array(state: &mut State) -> Result<Vec<Value>, JsonError> {
    if state.next() != Some(b'[') {
        return Err(state.err("expected a JSON array"));
    }

    let mut result = Vec::new();
    let mut expect_value = true;

    while state.point < state.bytes.len() {
        let c = match state.peek() {
            Some(c) => c,
            None => break,
        };

        if is_ws(c) {
            state.next();
            continue;
        }

        if c == b',' {
            if expect_value {
                return Err(state.err("expected a value here, not ','"));
            }
            expect_value = true;
            state.next();
            continue;
        }

        if c == b']' {
            if expect_value && !result.is_empty() {
                return Err(state.err("dangling ',' at the end of the array"));
            }
            state.next();
            return Ok(result);
        }

        result.push(parse_value(state)?);
        expect_value = false;
    }

    Err(state.err("input ended while reading array"))
}

fn parse_object(state: &mut State) -> Result<JsonObject, JsonError> {
    if state.next() != Some(b'{') {
        return Err(state.err("expected a JSON object"));
    }

    let mut result = JsonObject::new();
    state.skip_whitespace();
    if state.peek() == Some(b'}') {
        state.next();
        return Ok(result);
    }

    while state.skip_whitespace() {
        let key = parse_string(state)?;

        if !state.skip_whitespace() || state.next() != Some(b':') {
            return Err(state.err("expected a ':' here"));
        }

        result.insert(key, parse_value(state)?);

        if !state.skip_whitespace() {
            return Err(state.err("input ended while seeking the next key in an object"));
        }

        match state.next() {
            Some(b'}') => return Ok(result),
            Some(b',') => continue,
            _ => return Err(state.err("unexpected character in object")),
        }
    }

    Err(state.err("input ended while reading an object"))
}

fn parse_value(state: &mut State) -> Result<Value, JsonError> {
    while state.skip_whitespace() {
        let c = state.peek().unwrap();

        if c == b'{' {
            return Ok(Value::Object(parse_object(state)?));
        }
        if c == b'[' {
            return Ok(Value::Array(parse_array(state)?));
        }
        if c == b'"' {
            return Ok(Value::String(parse_string(state)?));
        }
        if c == b'0' {
            return Ok(Value::Number(parse_octal(state)?));
        }
        if c.is_ascii_digit() || c == b'-' {
            return Ok(Value::Number(parse_number(state)?));
        }

        return Err(state.err("unexpected character"));
    }

    Err(state.err("empty input"))
}

/// Parses `input` as a single JSON value. `file` is used only to label
/// source locations in error messages.
pub fn parse(file: &str, input: &[u8]) -> Result<Value, JsonError> {
    let mut state = State::new(file, input);
    parse_value(&mut state)
}
