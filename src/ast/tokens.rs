/// The kind of a token tree node.
///
/// The set is closed: every rule in a [`RuleTable`](crate::rules::RuleTable)
/// builds one of these, and folding turns a front kind into its composite
/// kind (`HookFront` + `HookBack` into `Hook`, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenType {
    /// The root of a tokenized document
    Root,

    /// A run of characters no rule matched
    Text,

    // Prose
    /// Line break (`\n`) in prose
    Br,

    /// Horizontal rule (`---` on its own line)
    Hr,

    /// Heading (`# Title`)
    ///
    /// # Examples
    /// ```text
    /// # Chapter One
    /// ### A smaller heading
    /// ```
    Heading,

    /// Bulleted list item (`* item`)
    BulletedItem,

    /// Numbered list item (`0. item`)
    NumberedItem,

    /// Alignment marker line (`==>`, `<==`, `=><=`, `<==>`)
    Align,

    /// HTML comment (`<!-- ... -->`)
    Comment,

    /// Backtick-delimited verbatim text
    Verbatim,

    /// Passage link
    ///
    /// # Examples
    /// ```text
    /// [[Go north->North]]
    /// [[North<-Go north]]
    /// [[North]]
    /// ```
    TwineLink,

    // Hooks
    /// Opening `[` or `|name>[`
    HookFront,
    /// Closing `]` or `]<name|`
    HookBack,
    /// A folded hook
    Hook,

    /// Opening `{`
    CollapsedFront,
    /// Closing `}`
    CollapsedBack,
    /// A folded whitespace-collapsing region
    Collapsed,

    // Emphasis: the openers are symmetric, each one closes a previous one
    BoldOpener,
    Bold,
    ItalicOpener,
    Italic,
    StrongOpener,
    Strong,
    EmOpener,
    Em,
    StrikeOpener,
    Strike,
    SupOpener,
    Sup,

    // Expressions
    /// Opening `(name:`
    MacroFront,
    /// Opening `(`
    GroupingFront,
    /// Closing `)`
    GroupingBack,
    /// A folded macro call
    ///
    /// # Examples
    /// ```text
    /// (set: $gold to 5)
    /// (print: $name's 1st)
    /// ```
    Macro,
    /// A folded parenthesised group
    Grouping,

    /// Whitespace inside an expression
    Whitespace,

    /// Story variable (`$name`)
    Variable,
    /// Temporary variable (`_name`)
    TempVariable,
    /// Built-in identifier (`it`, `time`, `visits`, `exits`, `pos`)
    Identifier,
    /// Quoted string literal
    String,
    /// Numeric literal
    Number,
    /// `true` or `false`
    Boolean,
    /// Colour literal (`#fff`, `red`)
    Colour,

    /// `,`
    Comma,
    /// `...`
    Spread,

    // Assignment
    To,
    Into,

    // Lambda clauses
    Where,
    When,
    Via,
    Making,
    With,
    Each,

    // Logic
    And,
    Or,
    Not,

    // Comparison
    Is,
    IsNot,
    Contains,
    IsIn,
    IsNotIn,
    /// `<`, `<=`, `>`, `>=` (the operator is in the node's fields)
    Inequality,

    // Arithmetic
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,

    // Property access
    /// `'s name`
    Property,
    /// `'s` followed by a computed property
    PossessiveOperator,
    /// `its name`
    ItsProperty,
    /// `its` followed by a computed property
    ItsOperator,
    /// `name of`
    BelongingProperty,
    /// `of` preceded by a computed property
    BelongingOperator,
}

impl TokenType {
    /// Stable snake_case name, used in tree dumps and log lines.
    pub fn name(self) -> &'static str {
        use TokenType::*;
        match self {
            Root => "root",
            Text => "text",
            Br => "br",
            Hr => "hr",
            Heading => "heading",
            BulletedItem => "bulleted_item",
            NumberedItem => "numbered_item",
            Align => "align",
            Comment => "comment",
            Verbatim => "verbatim",
            TwineLink => "twine_link",
            HookFront => "hook_front",
            HookBack => "hook_back",
            Hook => "hook",
            CollapsedFront => "collapsed_front",
            CollapsedBack => "collapsed_back",
            Collapsed => "collapsed",
            BoldOpener => "bold_opener",
            Bold => "bold",
            ItalicOpener => "italic_opener",
            Italic => "italic",
            StrongOpener => "strong_opener",
            Strong => "strong",
            EmOpener => "em_opener",
            Em => "em",
            StrikeOpener => "strike_opener",
            Strike => "strike",
            SupOpener => "sup_opener",
            Sup => "sup",
            MacroFront => "macro_front",
            GroupingFront => "grouping_front",
            GroupingBack => "grouping_back",
            Macro => "macro",
            Grouping => "grouping",
            Whitespace => "whitespace",
            Variable => "variable",
            TempVariable => "temp_variable",
            Identifier => "identifier",
            String => "string",
            Number => "number",
            Boolean => "boolean",
            Colour => "colour",
            Comma => "comma",
            Spread => "spread",
            To => "to",
            Into => "into",
            Where => "where",
            When => "when",
            Via => "via",
            Making => "making",
            With => "with",
            Each => "each",
            And => "and",
            Or => "or",
            Not => "not",
            Is => "is",
            IsNot => "is_not",
            Contains => "contains",
            IsIn => "is_in",
            IsNotIn => "is_not_in",
            Inequality => "inequality",
            Addition => "addition",
            Subtraction => "subtraction",
            Multiplication => "multiplication",
            Division => "division",
            Modulo => "modulo",
            Property => "property",
            PossessiveOperator => "possessive_operator",
            ItsProperty => "its_property",
            ItsOperator => "its_operator",
            BelongingProperty => "belonging_property",
            BelongingOperator => "belonging_operator",
        }
    }

    /// True for tokens that join operands rather than being operands.
    pub fn is_operator(self) -> bool {
        use TokenType::*;
        matches!(
            self,
            Comma
                | Spread
                | To
                | Into
                | Where
                | When
                | Via
                | Making
                | With
                | Each
                | And
                | Or
                | Not
                | Is
                | IsNot
                | Contains
                | IsIn
                | IsNotIn
                | Inequality
                | Addition
                | Subtraction
                | Multiplication
                | Division
                | Modulo
                | PossessiveOperator
                | ItsOperator
                | BelongingProperty
                | BelongingOperator
        )
    }

    /// Comparison operators: the ones an `and`/`or` operand may elide.
    pub fn is_comparison(self) -> bool {
        use TokenType::*;
        matches!(self, Is | IsNot | Contains | IsIn | IsNotIn | Inequality)
    }

    /// Lambda clause keywords.
    pub fn is_lambda_clause(self) -> bool {
        use TokenType::*;
        matches!(self, Where | When | Via | Making | With | Each)
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An operation implemented by the runtime operator library.
///
/// The tag is the key generated code uses to look the operation up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Addition or concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`)
    Modulo,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Logical AND (`and`)
    And,
    /// Logical OR (`or`)
    Or,
    /// Logical negation (`not`)
    Not,
    /// Equality (`is`)
    Is,
    /// Inequality (`is not`)
    IsNot,
    /// Membership, container on the left (`contains`)
    Contains,
    /// Membership, container on the right (`is in`)
    IsIn,
    /// Negated membership (`is not in`)
    IsNotIn,
}

impl Operator {
    pub fn tag(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterEqual => ">=",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::Is => "is",
            Operator::IsNot => "is not",
            Operator::Contains => "contains",
            Operator::IsIn => "is in",
            Operator::IsNotIn => "is not in",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "+" => Operator::Add,
            "-" => Operator::Subtract,
            "*" => Operator::Multiply,
            "/" => Operator::Divide,
            "%" => Operator::Modulo,
            "<" => Operator::LessThan,
            "<=" => Operator::LessEqual,
            ">" => Operator::GreaterThan,
            ">=" => Operator::GreaterEqual,
            "and" => Operator::And,
            "or" => Operator::Or,
            "not" => Operator::Not,
            "is" => Operator::Is,
            "is not" => Operator::IsNot,
            "contains" => Operator::Contains,
            "is in" => Operator::IsIn,
            "is not in" => Operator::IsNotIn,
            _ => return None,
        })
    }

    /// The comparator that gives the same answer with its operands swapped.
    ///
    /// `is not in` has no mirror in the operator library.
    pub fn mirrored(self) -> Option<Self> {
        match self {
            Operator::LessThan => Some(Operator::GreaterThan),
            Operator::LessEqual => Some(Operator::GreaterEqual),
            Operator::GreaterThan => Some(Operator::LessThan),
            Operator::GreaterEqual => Some(Operator::LessEqual),
            Operator::Is => Some(Operator::Is),
            Operator::IsNot => Some(Operator::IsNot),
            Operator::Contains => Some(Operator::IsIn),
            Operator::IsIn => Some(Operator::Contains),
            _ => None,
        }
    }

    /// Comparisons set the implicit subject (`it`) to their left operand.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::LessThan
                | Operator::LessEqual
                | Operator::GreaterThan
                | Operator::GreaterEqual
                | Operator::Is
                | Operator::IsNot
                | Operator::Contains
                | Operator::IsIn
                | Operator::IsNotIn
        )
    }
}
