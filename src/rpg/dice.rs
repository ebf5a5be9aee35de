//! Dice notation evaluator.
//!
//! Grammar: `[count] ('d'|'D') faces [('+'|'-') modifier]`, e.g. `2d6+3`, `d20`, `1d20-1`.
//! Surrounding whitespace is trimmed. Whitespace inside the group, or anything after it, is rejected.

use std::{fmt, str::FromStr};

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::TableError;

/// The only place randomness enters the table logic.
pub trait DiceSource {
    /// Draw one die, uniformly distributed in `1..=faces`.
    fn roll_die(&mut self, faces: u32) -> u32;
}

pub struct RngDice<R>(R);

impl RngDice<rand::rngs::ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::rng())
    }
}

impl RngDice<StdRng> {
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> DiceSource for RngDice<R> {
    fn roll_die(&mut self, faces: u32) -> u32 {
        self.0.random_range(1..=faces)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Number(u32),
    Die,
    Plus,
    Minus,
}

fn tokenize(notation: &str) -> Result<Vec<Token>, TableError> {
    let mut tokens = Vec::new();
    let mut chars = notation.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                return Err(TableError::notation(notation, "unexpected whitespace"));
            }
            'd' | 'D' => tokens.push(Token::Die),
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '0'..='9' => {
                let mut end = start + 1;
                while let Some((idx, _)) = chars.next_if(|(_, c)| c.is_ascii_digit()) {
                    end = idx + 1;
                }
                let number = notation[start..end]
                    .parse()
                    .map_err(|_| TableError::notation(notation, "number too large"))?;
                tokens.push(Token::Number(number));
            }
            _ => return Err(TableError::notation(notation, "unexpected character")),
        }
    }
    Ok(tokens)
}

/// Parsed `NdM+K`. Construction guarantees `count >= 1`, `faces >= 2` and that `count * faces` fits a `u32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiceExpression {
    count: u32,
    faces: u32,
    modifier: i32,
}

impl DiceExpression {
    pub fn parse(notation: &str) -> Result<Self, TableError> {
        let notation = notation.trim();
        let tokens = tokenize(notation)?;
        if tokens.is_empty() {
            return Err(TableError::notation(notation, "empty notation"));
        }

        let (count, rest) = match tokens.as_slice() {
            [Token::Number(count), rest @ ..] => (*count, rest),
            rest => (1, rest),
        };

        let (faces, rest) = match rest {
            [Token::Die, Token::Number(faces), rest @ ..] => (*faces, rest),
            [Token::Die, ..] => return Err(TableError::notation(notation, "missing faces")),
            _ => return Err(TableError::notation(notation, "missing 'd'")),
        };

        let modifier = match rest {
            [] => 0,
            [sign @ (Token::Plus | Token::Minus), Token::Number(value)] => {
                let value = i32::try_from(*value)
                    .map_err(|_| TableError::notation(notation, "modifier too large"))?;
                if *sign == Token::Minus { -value } else { value }
            }
            [Token::Plus | Token::Minus] | [Token::Plus | Token::Minus, Token::Die, ..] => {
                return Err(TableError::notation(
                    notation,
                    if rest.contains(&Token::Die) {
                        "multiple dice groups are not supported"
                    } else {
                        "sign must be followed by digits"
                    },
                ));
            }
            rest if rest.contains(&Token::Die) => {
                return Err(TableError::notation(
                    notation,
                    "multiple dice groups are not supported",
                ));
            }
            _ => return Err(TableError::notation(notation, "unexpected trailing input")),
        };

        Self::new(count, faces, modifier).map_err(|reason| TableError::notation(notation, reason))
    }

    fn new(count: u32, faces: u32, modifier: i32) -> Result<Self, &'static str> {
        if count < 1 {
            return Err("dice count must be at least 1");
        }
        if faces < 2 {
            return Err("die faces must be at least 2");
        }
        if count.checked_mul(faces).is_none() {
            return Err("too many dice");
        }
        Ok(Self {
            count,
            faces,
            modifier,
        })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn faces(&self) -> u32 {
        self.faces
    }

    pub fn modifier(&self) -> i32 {
        self.modifier
    }

    pub fn roll(&self, dice: &mut dyn DiceSource) -> RollResult {
        let rolls = (0..self.count)
            .map(|_| dice.roll_die(self.faces))
            .collect::<Vec<_>>();
        let total = rolls.iter().copied().map(i64::from).sum::<i64>() + i64::from(self.modifier);
        RollResult {
            expression: *self,
            rolls,
            total,
        }
    }
}

impl FromStr for DiceExpression {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.faces)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollResult {
    expression: DiceExpression,
    rolls: Vec<u32>,
    total: i64,
}

impl RollResult {
    pub fn expression(&self) -> &DiceExpression {
        &self.expression
    }

    pub fn rolls(&self) -> &[u32] {
        &self.rolls
    }

    pub fn modifier(&self) -> i32 {
        self.expression.modifier
    }

    pub fn total(&self) -> i64 {
        self.total
    }
}

pub fn evaluate(notation: &str, dice: &mut dyn DiceSource) -> Result<RollResult, TableError> {
    Ok(DiceExpression::parse(notation)?.roll(dice))
}

#[cfg(test)]
pub(crate) mod fixed {
    use std::collections::VecDeque;

    use super::DiceSource;

    /// Replays a fixed sequence of draws.
    pub(crate) struct FixedDice(VecDeque<u32>);

    impl FixedDice {
        pub(crate) fn new(draws: impl IntoIterator<Item = u32>) -> Self {
            Self(draws.into_iter().collect())
        }

        pub(crate) fn remaining(&self) -> usize {
            self.0.len()
        }
    }

    impl DiceSource for FixedDice {
        fn roll_die(&mut self, faces: u32) -> u32 {
            let draw = self.0.pop_front().expect("fixed dice exhausted");
            assert!((1..=faces).contains(&draw), "draw {draw} outside 1..={faces}");
            draw
        }
    }
}

#[cfg(test)]
mod test {
    use super::fixed::FixedDice;
    use super::*;

    fn parse(s: &str) -> DiceExpression {
        DiceExpression::parse(s).unwrap()
    }

    fn reason(s: &str) -> &'static str {
        match DiceExpression::parse(s) {
            Err(TableError::InvalidNotation { reason, .. }) => reason,
            other => panic!("{s:?} should be rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_full() {
        let expr = parse("2d6+3");
        assert_eq!((expr.count(), expr.faces(), expr.modifier()), (2, 6, 3));
        let expr = parse("1d20-1");
        assert_eq!((expr.count(), expr.faces(), expr.modifier()), (1, 20, -1));
        let expr = parse("101d6");
        assert_eq!((expr.count(), expr.faces()), (101, 6));
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(parse("d8"), parse("1d8"));
        assert_eq!(parse("3d4").modifier(), 0);
        assert_eq!(parse("D12+2"), parse("1d12+2"));
    }

    #[test]
    fn test_parse_whitespace() {
        assert_eq!(parse("  1d20+5 "), parse("1d20+5"));
        assert_eq!(reason("1d20+ 5"), "unexpected whitespace");
        assert_eq!(reason("1d20 +5"), "unexpected whitespace");
        assert_eq!(reason("1 d 20"), "unexpected whitespace");
        assert_eq!(reason("2d 6"), "unexpected whitespace");
        assert_eq!(reason("   "), "empty notation");
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(reason(""), "empty notation");
        assert_eq!(reason("abc"), "unexpected character");
        assert_eq!(reason("d"), "missing faces");
        assert_eq!(reason("20"), "missing 'd'");
        assert_eq!(reason("1d1"), "die faces must be at least 2");
        assert_eq!(reason("0d6"), "dice count must be at least 1");
        assert_eq!(reason("1d20+"), "sign must be followed by digits");
        assert_eq!(reason("1d6+1d4"), "multiple dice groups are not supported");
        assert_eq!(reason("1d6d4"), "multiple dice groups are not supported");
        assert_eq!(reason("1d20+5xyz"), "unexpected character");
        assert_eq!(reason("1d20+5 3"), "unexpected whitespace");
        assert_eq!(reason("1d20+5+3"), "unexpected trailing input");
        assert_eq!(reason("100000d100000"), "too many dice");
        assert_eq!(reason("99999999999d6"), "number too large");
        assert_eq!(reason("1d6+3000000000"), "modifier too large");
    }

    #[test]
    fn test_display() {
        assert_eq!(parse("d6").to_string(), "1d6");
        assert_eq!(parse("2D8-2").to_string(), "2d8-2");
        assert_eq!(parse("1d20+5").to_string(), "1d20+5");
    }

    #[test]
    fn test_roll_fixed() {
        let mut dice = FixedDice::new([4, 2]);
        let result = evaluate("2d6+3", &mut dice).unwrap();
        assert_eq!(result.rolls(), &[4, 2]);
        assert_eq!(result.modifier(), 3);
        assert_eq!(result.total(), 9);
        assert_eq!(dice.remaining(), 0);

        let result = evaluate("1d20-1", &mut FixedDice::new([1])).unwrap();
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_roll_reproducible() {
        let first = evaluate("4d6", &mut FixedDice::new([6, 5, 1, 3])).unwrap();
        let second = evaluate("4d6", &mut FixedDice::new([6, 5, 1, 3])).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_roll_bounds() {
        let mut dice = RngDice::seeded(42);
        for (count, faces, modifier) in [(1, 2, 0), (3, 6, 2), (10, 20, -4), (250, 1000, 7)] {
            let expr = DiceExpression::new(count, faces, modifier).unwrap();
            for _ in 0..50 {
                let result = expr.roll(&mut dice);
                assert_eq!(result.rolls().len(), count as usize);
                assert!(result.rolls().iter().all(|r| (1..=faces).contains(r)));
                let sum: i64 = result.rolls().iter().copied().map(i64::from).sum();
                assert_eq!(result.total(), sum + i64::from(modifier));
            }
        }
    }
}
