//! Core types for spark-scene.
//!
//! These types define the foundation the layout engine and the reconciler
//! build on: geometry handed to the host, size expressions parsed from props,
//! and the small enums that make up a container's layout record.

use std::str::FromStr;

use crate::error::Error;

// =============================================================================
// Geometry
// =============================================================================

/// Width and height in host units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Size along the main axis (`row` = horizontal main axis).
    #[inline]
    pub fn main(self, row: bool) -> f32 {
        if row { self.width } else { self.height }
    }

    /// Size along the cross axis.
    #[inline]
    pub fn cross(self, row: bool) -> f32 {
        if row { self.height } else { self.width }
    }

    /// Build a size from main/cross components.
    #[inline]
    pub fn from_axes(main: f32, cross: f32, row: bool) -> Self {
        if row { Self::new(main, cross) } else { Self::new(cross, main) }
    }

    /// Shrink by edges, clamped to zero.
    pub fn inset(self, edges: Edges) -> Self {
        Self::new(
            (self.width - edges.horizontal()).max(0.0),
            (self.height - edges.vertical()).max(0.0),
        )
    }
}

/// A position in host units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Position and size of a node, relative to its host parent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn origin(&self) -> Point {
        Point { x: self.x, y: self.y }
    }
}

/// Four-sided spacing (padding or margin).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const ZERO: Self = Self::all(0.0);

    pub const fn all(value: f32) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// Vertical then horizontal, CSS shorthand order.
    pub const fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self { top: vertical, right: horizontal, bottom: vertical, left: horizontal }
    }

    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    #[inline]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    #[inline]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Total spacing along the main axis.
    #[inline]
    pub fn main(&self, row: bool) -> f32 {
        if row { self.horizontal() } else { self.vertical() }
    }

    /// Total spacing along the cross axis.
    #[inline]
    pub fn cross(&self, row: bool) -> f32 {
        if row { self.vertical() } else { self.horizontal() }
    }

    /// Leading edge on the main axis (left for rows, top for columns).
    #[inline]
    pub fn main_start(&self, row: bool) -> f32 {
        if row { self.left } else { self.top }
    }

    /// Leading edge on the cross axis.
    #[inline]
    pub fn cross_start(&self, row: bool) -> f32 {
        if row { self.top } else { self.left }
    }
}

// =============================================================================
// Dimension - size expressions
// =============================================================================

/// Linear size expression produced by `calc()`.
///
/// Every accepted `calc()` input normalises to
/// `px + percent% of basis + vw% of viewport width + vh% of viewport height`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalcExpr {
    pub px: f32,
    pub percent: f32,
    pub vw: f32,
    pub vh: f32,
}

impl CalcExpr {
    fn scaled(self, k: f32) -> Self {
        Self {
            px: self.px * k,
            percent: self.percent * k,
            vw: self.vw * k,
            vh: self.vh * k,
        }
    }

    fn plus(self, other: Self, sign: f32) -> Self {
        Self {
            px: self.px + sign * other.px,
            percent: self.percent + sign * other.percent,
            vw: self.vw + sign * other.vw,
            vh: self.vh + sign * other.vh,
        }
    }

    fn eval(self, basis: f32, viewport: Size) -> f32 {
        self.px
            + basis * self.percent / 100.0
            + viewport.width * self.vw / 100.0
            + viewport.height * self.vh / 100.0
    }
}

/// A size value as written in props.
///
/// - `Auto`: natural content size
/// - `Px(n)`: absolute host units
/// - `Percent(n)`: percentage (0-100) of the parent's content area
/// - `Vw(n)` / `Vh(n)`: percentage of the viewport
/// - `Fill`: consume remaining main-axis space like `flex: 1`; on the
///   cross axis it spans the whole content area
/// - `Calc(expr)`: linear combination of the above units
///
/// # Examples
///
/// ```
/// use spark_scene::types::Dimension;
///
/// let half: Dimension = "50%".parse().unwrap();
/// assert_eq!(half, Dimension::Percent(50.0));
///
/// let inset: Dimension = "calc(100% - 20px)".parse().unwrap();
/// assert_eq!(inset.resolve(200.0, Default::default()), Some(180.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Auto,
    Px(f32),
    Percent(f32),
    Vw(f32),
    Vh(f32),
    Fill,
    Calc(CalcExpr),
}

impl Dimension {
    /// Resolve against a basis (the parent's content area on this axis).
    ///
    /// Returns `None` for `Auto`. Results are clamped to zero.
    pub fn resolve(self, basis: f32, viewport: Size) -> Option<f32> {
        let value = match self {
            Self::Auto => return None,
            Self::Px(v) => v,
            Self::Percent(p) => basis * p / 100.0,
            Self::Vw(v) => viewport.width * v / 100.0,
            Self::Vh(v) => viewport.height * v / 100.0,
            Self::Fill => basis,
            Self::Calc(expr) => expr.eval(basis, viewport),
        };
        Some(value.max(0.0))
    }

    #[inline]
    pub fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    #[inline]
    pub fn is_fill(self) -> bool {
        matches!(self, Self::Fill)
    }
}

impl From<f32> for Dimension {
    fn from(value: f32) -> Self {
        Self::Px(value)
    }
}

impl From<f64> for Dimension {
    fn from(value: f64) -> Self {
        Self::Px(value as f32)
    }
}

impl From<i32> for Dimension {
    fn from(value: i32) -> Self {
        Self::Px(value as f32)
    }
}

impl From<u16> for Dimension {
    fn from(value: u16) -> Self {
        Self::Px(value as f32)
    }
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        match trimmed {
            "" | "auto" => return Ok(Self::Auto),
            "fill" => return Ok(Self::Fill),
            _ => {}
        }

        if let Some(body) = trimmed.strip_prefix("calc(").and_then(|s| s.strip_suffix(')')) {
            let expr = CalcParser::new(input, body).parse()?;
            return Ok(Self::Calc(expr));
        }

        let mut parser = CalcParser::new(input, trimmed);
        match parser.single()? {
            Operand::Number(n) => Ok(Self::Px(n)),
            Operand::Length(expr) => Ok(collapse(expr)),
        }
    }
}

/// Turn a single-unit expression back into its plain variant.
fn collapse(expr: CalcExpr) -> Dimension {
    let units = [expr.px, expr.percent, expr.vw, expr.vh];
    if units.iter().filter(|v| **v != 0.0).count() > 1 {
        return Dimension::Calc(expr);
    }
    if expr.percent != 0.0 {
        Dimension::Percent(expr.percent)
    } else if expr.vw != 0.0 {
        Dimension::Vw(expr.vw)
    } else if expr.vh != 0.0 {
        Dimension::Vh(expr.vh)
    } else {
        Dimension::Px(expr.px)
    }
}

// =============================================================================
// calc() parser
// =============================================================================

enum Operand {
    Number(f32),
    Length(CalcExpr),
}

impl Operand {
    fn into_expr(self) -> CalcExpr {
        match self {
            Self::Number(n) => CalcExpr { px: n, ..CalcExpr::default() },
            Self::Length(expr) => expr,
        }
    }
}

/// Recursive-descent parser over `expr := term (('+'|'-') term)*`,
/// `term := factor (('*'|'/') factor)*`, `factor := number unit? | '(' expr ')' | '-' factor`.
struct CalcParser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> CalcParser<'a> {
    fn new(input: &'a str, body: &'a str) -> Self {
        Self { input, bytes: body.as_bytes(), pos: 0 }
    }

    fn fail(&self, reason: &'static str) -> Error {
        Error::InvalidDimension { input: self.input.to_string(), reason }
    }

    fn parse(&mut self) -> Result<CalcExpr, Error> {
        let value = self.expr()?;
        self.skip_ws();
        if self.pos != self.bytes.len() {
            return Err(self.fail("unexpected trailing input"));
        }
        Ok(value.into_expr())
    }

    fn single(&mut self) -> Result<Operand, Error> {
        let value = self.factor()?;
        self.skip_ws();
        if self.pos != self.bytes.len() {
            return Err(self.fail("expected a single value"));
        }
        Ok(value)
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.bytes.get(self.pos).copied()
    }

    fn expr(&mut self) -> Result<Operand, Error> {
        let mut acc = self.term()?;
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            let sign = if op == b'+' { 1.0 } else { -1.0 };
            acc = match (acc, rhs) {
                (Operand::Number(a), Operand::Number(b)) => Operand::Number(a + sign * b),
                (a, b) => Operand::Length(a.into_expr().plus(b.into_expr(), sign)),
            };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<Operand, Error> {
        let mut acc = self.factor()?;
        while let Some(op @ (b'*' | b'/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            acc = match (op, acc, rhs) {
                (b'*', Operand::Number(a), Operand::Number(b)) => Operand::Number(a * b),
                (b'*', Operand::Number(k), Operand::Length(e))
                | (b'*', Operand::Length(e), Operand::Number(k)) => Operand::Length(e.scaled(k)),
                (b'*', Operand::Length(_), Operand::Length(_)) => {
                    return Err(self.fail("cannot multiply two lengths"));
                }
                (_, _, Operand::Number(d)) if d == 0.0 => {
                    return Err(self.fail("division by zero"));
                }
                (_, Operand::Number(a), Operand::Number(d)) => Operand::Number(a / d),
                (_, Operand::Length(e), Operand::Number(d)) => Operand::Length(e.scaled(1.0 / d)),
                (_, _, Operand::Length(_)) => return Err(self.fail("cannot divide by a length")),
            };
        }
        Ok(acc)
    }

    fn factor(&mut self) -> Result<Operand, Error> {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let inner = self.expr()?;
                if self.peek() != Some(b')') {
                    return Err(self.fail("unbalanced parenthesis"));
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(b'-') => {
                self.pos += 1;
                Ok(match self.factor()? {
                    Operand::Number(n) => Operand::Number(-n),
                    Operand::Length(e) => Operand::Length(e.scaled(-1.0)),
                })
            }
            Some(b) if b.is_ascii_digit() || b == b'.' => self.number(),
            Some(_) => Err(self.fail("unexpected character")),
            None => Err(self.fail("unexpected end of input")),
        }
    }

    fn number(&mut self) -> Result<Operand, Error> {
        let start = self.pos;
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_digit() || self.bytes[self.pos] == b'.')
        {
            self.pos += 1;
        }
        let digits = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| self.fail("invalid number"))?;
        let value: f32 = digits.parse().map_err(|_| self.fail("invalid number"))?;

        let unit_start = self.pos;
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_alphabetic() || self.bytes[self.pos] == b'%')
        {
            self.pos += 1;
        }
        let unit = &self.bytes[unit_start..self.pos];
        let expr = match unit {
            b"" => return Ok(Operand::Number(value)),
            b"px" => CalcExpr { px: value, ..CalcExpr::default() },
            b"%" => CalcExpr { percent: value, ..CalcExpr::default() },
            b"vw" => CalcExpr { vw: value, ..CalcExpr::default() },
            b"vh" => CalcExpr { vh: value, ..CalcExpr::default() },
            _ => return Err(self.fail("unknown unit")),
        };
        Ok(Operand::Length(expr))
    }
}

// =============================================================================
// Layout enums
// =============================================================================

/// How a container arranges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Column,
    Row,
    /// Children overlap at the content origin, offset by their own `x`/`y`.
    Stack,
}

impl Direction {
    #[inline]
    pub fn is_row(self) -> bool {
        matches!(self, Self::Row)
    }
}

/// Main-axis distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Cross-axis alignment of items within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Start,
    Center,
    End,
    #[default]
    Stretch,
}

/// Cross-axis distribution of wrapped lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignContent {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    #[default]
    NoWrap,
    Wrap,
}

/// Overflow only affects clipping, never size calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim(s: &str) -> Dimension {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_simple_units() {
        assert_eq!(dim("auto"), Dimension::Auto);
        assert_eq!(dim("fill"), Dimension::Fill);
        assert_eq!(dim("12"), Dimension::Px(12.0));
        assert_eq!(dim("12px"), Dimension::Px(12.0));
        assert_eq!(dim(" 50% "), Dimension::Percent(50.0));
        assert_eq!(dim("10vw"), Dimension::Vw(10.0));
        assert_eq!(dim("25vh"), Dimension::Vh(25.0));
    }

    #[test]
    fn test_parse_calc() {
        let d = dim("calc(100% - 20px)");
        assert_eq!(
            d,
            Dimension::Calc(CalcExpr { px: -20.0, percent: 100.0, vw: 0.0, vh: 0.0 })
        );
        assert_eq!(d.resolve(300.0, Size::ZERO), Some(280.0));

        let nested = dim("calc((50% + 10px) * 2 - 1vw)");
        let viewport = Size::new(1000.0, 500.0);
        assert_eq!(nested.resolve(100.0, viewport), Some(100.0 + 20.0 - 10.0));
    }

    #[test]
    fn test_parse_errors() {
        assert!("12em".parse::<Dimension>().is_err());
        assert!("calc(10px * 10px)".parse::<Dimension>().is_err());
        assert!("calc(10px / 0)".parse::<Dimension>().is_err());
        assert!("calc((10px)".parse::<Dimension>().is_err());
        assert!("calc(10px +)".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_resolve_clamps_negative() {
        assert_eq!(dim("calc(10px - 50%)").resolve(100.0, Size::ZERO), Some(0.0));
        assert_eq!(Dimension::Auto.resolve(100.0, Size::ZERO), None);
        assert_eq!(Dimension::Fill.resolve(42.0, Size::ZERO), Some(42.0));
    }

    #[test]
    fn test_percent_of_content_area() {
        let content = Size::new(710.0, 100.0).inset(Edges::all(10.0));
        assert_eq!(Dimension::Percent(50.0).resolve(content.width, Size::ZERO), Some(345.0));
    }

    #[test]
    fn test_edges_axes() {
        let e = Edges::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(e.main(true), 6.0);
        assert_eq!(e.main(false), 4.0);
        assert_eq!(e.main_start(true), 4.0);
        assert_eq!(e.cross_start(true), 1.0);
    }
}
