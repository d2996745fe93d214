//! Expression rules, active inside macro calls and groupings.
//!
//! Rules shared with prose (`hook_front`, `macro_front`, `variable`,
//! `temp_variable`) are declared once in [`super::markup`] and only listed
//! here.

use crate::ast::{Operator, TokenType};
use crate::rules::{Follow, Mode, Partial, Rule, RuleError, group_text};

const AFTER_TEXT: &[Follow] = &[Follow::Kind(TokenType::Text)];

const GROUPING_MATCHES: &[(TokenType, TokenType)] = &[
    (TokenType::MacroFront, TokenType::Macro),
    (TokenType::GroupingFront, TokenType::Grouping),
];
const GROUPING_CROSS: &[TokenType] = &[TokenType::HookFront, TokenType::CollapsedFront];

/// Tokens a `'s` may directly follow.
const POSSESSIVE_SUBJECTS: &[Follow] = &[
    Follow::Kind(TokenType::Variable),
    Follow::Kind(TokenType::TempVariable),
    Follow::Kind(TokenType::Property),
    Follow::Kind(TokenType::ItsProperty),
    Follow::Kind(TokenType::Identifier),
    Follow::Kind(TokenType::Macro),
    Follow::Kind(TokenType::Grouping),
    Follow::Kind(TokenType::Hook),
    Follow::Kind(TokenType::String),
];

pub const CODE_ORDER: &[&str] = &[
    "whitespace",
    "property",
    "possessive_operator",
    "string",
    "hook_front_named",
    "hook_front",
    "macro_front",
    "grouping_front",
    "grouping_back",
    "spread",
    "comma",
    "its_property",
    "its_operator",
    "is_not_in",
    "is_not",
    "is_in",
    "is",
    "contains",
    "and",
    "or",
    "not",
    "into",
    "to",
    "where",
    "when",
    "via",
    "making",
    "with",
    "each",
    "temp_variable",
    "variable",
    "belonging_property",
    "belonging_operator",
    "inequality",
    "addition",
    "subtraction",
    "multiplication",
    "division",
    "modulo",
    "number",
    "boolean",
    "colour_hex",
    "colour_name",
    "identifier",
];

/// Decode the body of a quoted string: a backslash escapes the next character.
pub(crate) fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// A keyword operator rule: the word must not continue a run of text.
fn keyword(
    name: &'static str,
    pattern: &str,
    peek: &'static str,
    build: fn(&regex::Captures<'_>) -> Partial,
) -> Result<Rule, RuleError> {
    Rule::new(name, pattern, build).map(|r| r.peek(peek).cannot_follow(AFTER_TEXT))
}

pub fn rules() -> Result<Vec<Rule>, RuleError> {
    let rules = [
        Rule::new("whitespace", r"\s+", |_| Partial::new(TokenType::Whitespace)),
        Rule::new("property", r"'s\s+(\w+)", |c| {
            Partial::new(TokenType::Property).named(group_text(c, 1))
        })
        .map(|r| r.peek("'s").can_follow(POSSESSIVE_SUBJECTS)),
        Rule::new("possessive_operator", r"'s", |_| {
            Partial::new(TokenType::PossessiveOperator)
        })
        .map(|r| r.peek("'s").can_follow(POSSESSIVE_SUBJECTS)),
        Rule::new(
            "string",
            r#""((?:[^"\\]|\\[\s\S])*)"|'((?:[^'\\]|\\[\s\S])*)'"#,
            |c| {
                let body = c.get(1).or_else(|| c.get(2)).map_or("", |m| m.as_str());
                Partial::new(TokenType::String).value(unescape(body))
            },
        ),
        Rule::new("grouping_front", r"\(", |_| {
            Partial::new(TokenType::GroupingFront).front(Some(Mode::Code))
        })
        .map(|r| r.peek("(")),
        Rule::new("grouping_back", r"\)", |_| {
            Partial::new(TokenType::GroupingBack)
                .closes(GROUPING_MATCHES)
                .cannot_cross(GROUPING_CROSS)
        })
        .map(|r| r.peek(")")),
        Rule::new("spread", r"\.\.\.", |_| Partial::new(TokenType::Spread)).map(|r| r.peek("...")),
        Rule::new("comma", r",", |_| Partial::new(TokenType::Comma)).map(|r| r.peek(",")),
        keyword("its_property", r"its\s+(\w+)", "its", |c| {
            Partial::new(TokenType::ItsProperty).named(group_text(c, 1))
        }),
        keyword("its_operator", r"its\b", "its", |_| {
            Partial::new(TokenType::ItsOperator)
        }),
        keyword("is_not_in", r"is\s+not\s+in\b", "is", |_| {
            Partial::new(TokenType::IsNotIn).operator(Operator::IsNotIn)
        }),
        keyword("is_not", r"is\s+not\b", "is", |_| {
            Partial::new(TokenType::IsNot).operator(Operator::IsNot)
        }),
        keyword("is_in", r"is\s+in\b", "is", |_| {
            Partial::new(TokenType::IsIn).operator(Operator::IsIn)
        }),
        keyword("is", r"is\b", "is", |_| {
            Partial::new(TokenType::Is).operator(Operator::Is)
        }),
        keyword("contains", r"contains\b", "contains", |_| {
            Partial::new(TokenType::Contains).operator(Operator::Contains)
        }),
        keyword("and", r"and\b", "and", |_| {
            Partial::new(TokenType::And).operator(Operator::And)
        }),
        keyword("or", r"or\b", "or", |_| {
            Partial::new(TokenType::Or).operator(Operator::Or)
        }),
        keyword("not", r"not\b", "not", |_| {
            Partial::new(TokenType::Not).operator(Operator::Not)
        }),
        keyword("into", r"into\b", "into", |_| Partial::new(TokenType::Into)),
        keyword("to", r"to\b", "to", |_| Partial::new(TokenType::To)),
        keyword("where", r"where\b", "where", |_| Partial::new(TokenType::Where)),
        keyword("when", r"when\b", "when", |_| Partial::new(TokenType::When)),
        keyword("via", r"via\b", "via", |_| Partial::new(TokenType::Via)),
        keyword("making", r"making\b", "making", |_| Partial::new(TokenType::Making)),
        keyword("with", r"with\b", "with", |_| Partial::new(TokenType::With)),
        keyword("each", r"each\b", "each", |_| Partial::new(TokenType::Each)),
        Rule::new("belonging_property", r"([A-Za-z0-9]\w*)\s+of\b", |c| {
            Partial::new(TokenType::BelongingProperty).named(group_text(c, 1))
        })
        .map(|r| r.cannot_follow(AFTER_TEXT)),
        keyword("belonging_operator", r"of\b", "of", |_| {
            Partial::new(TokenType::BelongingOperator)
        }),
        Rule::new("inequality", r"<=|>=|<|>", |c| {
            let operator = match group_text(c, 0) {
                "<=" => Operator::LessEqual,
                ">=" => Operator::GreaterEqual,
                "<" => Operator::LessThan,
                _ => Operator::GreaterThan,
            };
            Partial::new(TokenType::Inequality).operator(operator)
        }),
        Rule::new("addition", r"\+", |_| {
            Partial::new(TokenType::Addition).operator(Operator::Add)
        })
        .map(|r| r.peek("+")),
        Rule::new("subtraction", r"-", |_| {
            Partial::new(TokenType::Subtraction).operator(Operator::Subtract)
        })
        .map(|r| r.peek("-")),
        Rule::new("multiplication", r"\*", |_| {
            Partial::new(TokenType::Multiplication).operator(Operator::Multiply)
        })
        .map(|r| r.peek("*")),
        Rule::new("division", r"/", |_| {
            Partial::new(TokenType::Division).operator(Operator::Divide)
        })
        .map(|r| r.peek("/")),
        Rule::new("modulo", r"%", |_| {
            Partial::new(TokenType::Modulo).operator(Operator::Modulo)
        })
        .map(|r| r.peek("%")),
        Rule::new("number", r"\d+(?:\.\d+)?", |c| {
            Partial::new(TokenType::Number).value(group_text(c, 0))
        }),
        Rule::new("boolean", r"(?:true|false)\b", |c| {
            Partial::new(TokenType::Boolean).value(group_text(c, 0))
        })
        .map(|r| r.cannot_follow(AFTER_TEXT)),
        Rule::new("colour_hex", r"#(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3})\b", |c| {
            Partial::new(TokenType::Colour).value(group_text(c, 0).to_lowercase())
        })
        .map(|r| r.peek("#")),
        Rule::new(
            "colour_name",
            r"(?:red|orange|yellow|lime|green|aqua|cyan|blue|navy|purple|fuchsia|magenta|white|black|grey|gray|transparent)\b",
            |c| Partial::new(TokenType::Colour).value(group_text(c, 0)),
        )
        .map(|r| r.cannot_follow(AFTER_TEXT)),
        Rule::new("identifier", r"(?:it|time|visits|exits|pos)\b", |c| {
            Partial::new(TokenType::Identifier).named(group_text(c, 0))
        })
        .map(|r| r.cannot_follow(AFTER_TEXT)),
    ];

    rules.into_iter().collect()
}
