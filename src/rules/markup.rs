//! Prose rules.

use crate::ast::TokenType;
use crate::rules::{Follow, Mode, Partial, Rule, RuleError, group_range, group_text};

const LINE_START: &[Follow] = &[Follow::Start, Follow::Kind(TokenType::Br)];
const AFTER_TEXT: &[Follow] = &[Follow::Kind(TokenType::Text)];

const HOOK_MATCHES: &[(TokenType, TokenType)] = &[(TokenType::HookFront, TokenType::Hook)];
const HOOK_CROSS: &[TokenType] = &[TokenType::MacroFront, TokenType::GroupingFront];

const COLLAPSED_MATCHES: &[(TokenType, TokenType)] =
    &[(TokenType::CollapsedFront, TokenType::Collapsed)];

const EMPHASIS_CROSS: &[TokenType] = &[
    TokenType::HookFront,
    TokenType::CollapsedFront,
    TokenType::MacroFront,
];

pub const MARKUP_ORDER: &[&str] = &[
    "hr",
    "heading",
    "bulleted",
    "numbered",
    "align",
    "br",
    "comment",
    "verbatim",
    "twine_link",
    "hook_front_named",
    "hook_front",
    "hook_back_named",
    "hook_back",
    "collapsed_front",
    "collapsed_back",
    "macro_front",
    "variable",
    "temp_variable",
    "strong",
    "em",
    "bold",
    "italic",
    "strike",
    "sup",
];

/// Markup without the line-start block rules.
pub const INLINE_ORDER: &[&str] = &[
    "br",
    "comment",
    "verbatim",
    "twine_link",
    "hook_front_named",
    "hook_front",
    "hook_back_named",
    "hook_back",
    "collapsed_front",
    "collapsed_back",
    "macro_front",
    "variable",
    "temp_variable",
    "strong",
    "em",
    "bold",
    "italic",
    "strike",
    "sup",
];

/// Split link source into (text range, passage name), relative to `body`.
fn split_link(body: &str) -> (std::ops::Range<usize>, String) {
    if let Some(pos) = body.rfind("->") {
        (0..pos, body[pos + 2..].trim().to_string())
    } else if let Some(pos) = body.find("<-") {
        (pos + 2..body.len(), body[..pos].trim().to_string())
    } else if let Some(pos) = body.find('|') {
        (0..pos, body[pos + 1..].trim().to_string())
    } else {
        (0..body.len(), body.trim().to_string())
    }
}

fn align_value(marker: &str) -> &'static str {
    let arrow_right = marker.ends_with('>');
    let arrow_left = marker.starts_with('<');
    if marker.contains("><") {
        "center"
    } else if arrow_left && arrow_right {
        "justify"
    } else if arrow_left {
        "left"
    } else {
        "right"
    }
}

macro_rules! emphasis {
    ($name:literal, $pattern:literal, $peek:literal, $opener:ident, $folded:ident) => {
        Rule::new($name, $pattern, |_| {
            const MATCHES: &[(TokenType, TokenType)] =
                &[(TokenType::$opener, TokenType::$folded)];
            Partial::new(TokenType::$opener)
                .front(None)
                .closes(MATCHES)
                .cannot_cross(EMPHASIS_CROSS)
        })
        .map(|r| r.peek($peek))
    };
}

pub fn rules() -> Result<Vec<Rule>, RuleError> {
    let rules = [
        Rule::new("hr", r" {0,3}-{3,}[ \t]*(?m:$)", |_| Partial::new(TokenType::Hr))
            .map(|r| r.can_follow(LINE_START)),
        Rule::new("heading", r"(#{1,6})[ \t]*([^\n]*)", |c| {
            let inner = group_range(c, 2).unwrap_or_default();
            Partial::new(TokenType::Heading)
                .depth(group_text(c, 1).len())
                .inner(inner, Some(Mode::Inline))
        })
        .map(|r| r.peek("#").can_follow(LINE_START)),
        Rule::new("bulleted", r"(\*+)[ \t]+([^\n]*)", |c| {
            let inner = group_range(c, 2).unwrap_or_default();
            Partial::new(TokenType::BulletedItem)
                .depth(group_text(c, 1).len())
                .inner(inner, Some(Mode::Inline))
        })
        .map(|r| r.peek("*").can_follow(LINE_START)),
        Rule::new("numbered", r"(0\.+)[ \t]+([^\n]*)", |c| {
            let inner = group_range(c, 2).unwrap_or_default();
            Partial::new(TokenType::NumberedItem)
                .depth(group_text(c, 1).len() - 1)
                .inner(inner, Some(Mode::Inline))
        })
        .map(|r| r.peek("0").can_follow(LINE_START)),
        Rule::new("align", r"(<==+>|=+><=+|<==+|==+>)[ \t]*(?m:$)", |c| {
            Partial::new(TokenType::Align).value(align_value(group_text(c, 1)))
        })
        .map(|r| r.can_follow(LINE_START)),
        Rule::new("br", r"\n", |_| Partial::new(TokenType::Br)).map(|r| r.peek("\n")),
        Rule::new("comment", r"<!--[\s\S]*?-->", |_| Partial::new(TokenType::Comment))
            .map(|r| r.peek("<!--")),
        Rule::new("verbatim", r"```([\s\S]+?)```|``([\s\S]+?)``|`([^`]+)`", |c| {
            let inner = (1..=3).find_map(|g| group_range(c, g)).unwrap_or_default();
            Partial::new(TokenType::Verbatim).inner(inner, None)
        })
        .map(|r| r.peek("`")),
        Rule::new("twine_link", r"\[\[(.+?)\]\]", |c| {
            let body = group_text(c, 1);
            let (text, passage) = split_link(body);
            Partial::new(TokenType::TwineLink)
                .value(passage)
                .inner(text.start + 2..text.end + 2, Some(Mode::Inline))
        })
        .map(|r| r.peek("[[")),
        Rule::new("hook_front_named", r"\|(\w+)>\[", |c| {
            Partial::new(TokenType::HookFront)
                .front(Some(Mode::Markup))
                .named(group_text(c, 1))
        })
        .map(|r| r.peek("|")),
        Rule::new("hook_front", r"\[", |_| {
            Partial::new(TokenType::HookFront).front(Some(Mode::Markup))
        })
        .map(|r| r.peek("[")),
        Rule::new("hook_back_named", r"\]<(\w+)\|", |c| {
            Partial::new(TokenType::HookBack)
                .closes(HOOK_MATCHES)
                .cannot_cross(HOOK_CROSS)
                .named(group_text(c, 1))
        })
        .map(|r| r.peek("]")),
        Rule::new("hook_back", r"\]", |_| {
            Partial::new(TokenType::HookBack)
                .closes(HOOK_MATCHES)
                .cannot_cross(HOOK_CROSS)
        })
        .map(|r| r.peek("]")),
        Rule::new("collapsed_front", r"\{", |_| {
            Partial::new(TokenType::CollapsedFront).front(Some(Mode::Markup))
        })
        .map(|r| r.peek("{")),
        Rule::new("collapsed_back", r"\}", |_| {
            Partial::new(TokenType::CollapsedBack)
                .closes(COLLAPSED_MATCHES)
                .cannot_cross(HOOK_CROSS)
        })
        .map(|r| r.peek("}")),
        Rule::new("macro_front", r"\((\$?[\w\-]+):", |c| {
            Partial::new(TokenType::MacroFront)
                .front(Some(Mode::Code))
                .named(group_text(c, 1))
        })
        .map(|r| r.peek("(")),
        Rule::new("variable", r"\$(\w+)", |c| {
            Partial::new(TokenType::Variable).named(group_text(c, 1))
        })
        .map(|r| r.peek("$")),
        Rule::new("temp_variable", r"_(\w+)", |c| {
            Partial::new(TokenType::TempVariable).named(group_text(c, 1))
        })
        .map(|r| r.peek("_").cannot_follow(AFTER_TEXT)),
        emphasis!("strong", r"\*\*", "**", StrongOpener, Strong),
        emphasis!("em", r"\*", "*", EmOpener, Em),
        emphasis!("bold", r"''", "''", BoldOpener, Bold),
        emphasis!("italic", r"//", "//", ItalicOpener, Italic),
        emphasis!("strike", r"~~", "~~", StrikeOpener, Strike),
        emphasis!("sup", r"\^\^", "^^", SupOpener, Sup),
    ];

    rules.into_iter().collect()
}
