//! Lexical tokenizer: turns one line of text into typed tokens.
//!
//! ## Contract
//!
//! A [`Lexer`] returns tokens whose texts, concatenated in order, equal the
//! input exactly.  The render pipeline checks this and reports a
//! [`crate::render::RenderError`] rather than drawing a corrupted line.
//!
//! ## Lookup chain
//!
//! [`resolve`] picks a lexer for a language hint:
//!
//! 1. a registered lexer whose name or alias matches the hint
//!    (case-insensitive),
//! 2. otherwise the registered lexer that scores the source highest in
//!    [`Lexer::analyse`],
//! 3. otherwise [`PlainText`], which yields the whole line as one
//!    [`TokenKind::Text`] token.
//!
//! Built-in lexers are [`RegexLexer`]s: an ordered rule list tried at each
//! position, first match wins.  A position no rule matches becomes a
//! one-character [`TokenKind::Error`] token, so a regex lexer never fails.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use regex::{Regex, RegexBuilder};

// ── TokenKind ─────────────────────────────────────────────────────────────────

/// The lexical category of a token.
///
/// Kinds form a shallow hierarchy through [`TokenKind::parent`] so that a
/// theme which styles only `Keyword` also styles `KeywordType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    Text,
    Whitespace,
    Error,
    Keyword,
    KeywordConstant,
    KeywordType,
    Name,
    NameBuiltin,
    NameTag,
    NameVariable,
    Literal,
    LiteralNumber,
    LiteralString,
    Operator,
    Punctuation,
    Comment,
    CommentMultiline,
    CommentSingle,
}

impl TokenKind {
    /// Every kind, in declaration order.
    pub const ALL: &'static [TokenKind] = &[
        TokenKind::Text,
        TokenKind::Whitespace,
        TokenKind::Error,
        TokenKind::Keyword,
        TokenKind::KeywordConstant,
        TokenKind::KeywordType,
        TokenKind::Name,
        TokenKind::NameBuiltin,
        TokenKind::NameTag,
        TokenKind::NameVariable,
        TokenKind::Literal,
        TokenKind::LiteralNumber,
        TokenKind::LiteralString,
        TokenKind::Operator,
        TokenKind::Punctuation,
        TokenKind::Comment,
        TokenKind::CommentMultiline,
        TokenKind::CommentSingle,
    ];

    /// The enclosing category, or `None` for a top-level kind.
    pub fn parent(self) -> Option<TokenKind> {
        use TokenKind::*;
        match self {
            KeywordConstant | KeywordType => Some(Keyword),
            NameBuiltin | NameTag | NameVariable => Some(Name),
            LiteralNumber | LiteralString => Some(Literal),
            CommentMultiline | CommentSingle => Some(Comment),
            Whitespace => Some(Text),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        use TokenKind::*;
        match self {
            Text             => "Text",
            Whitespace       => "Text.Whitespace",
            Error            => "Error",
            Keyword          => "Keyword",
            KeywordConstant  => "Keyword.Constant",
            KeywordType      => "Keyword.Type",
            Name             => "Name",
            NameBuiltin      => "Name.Builtin",
            NameTag          => "Name.Tag",
            NameVariable     => "Name.Variable",
            Literal          => "Literal",
            LiteralNumber    => "Literal.Number",
            LiteralString    => "Literal.String",
            Operator         => "Operator",
            Punctuation      => "Punctuation",
            Comment          => "Comment",
            CommentMultiline => "Comment.Multiline",
            CommentSingle    => "Comment.Single",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Token ─────────────────────────────────────────────────────────────────────

/// A typed, contiguous span of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }

    /// Length in chars (the unit of caret columns).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Merge runs of adjacent tokens that share a kind.
pub fn coalesce(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for tok in tokens {
        if tok.text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(prev) if prev.kind == tok.kind => prev.text.push_str(&tok.text),
            _ => out.push(tok),
        }
    }
    out
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    /// A rule pattern failed to compile.
    #[error("lexer {lexer}: invalid rule: {source}")]
    InvalidRule {
        lexer: &'static str,
        #[source]
        source: regex::Error,
    },
    /// The lexer could not classify input at a char offset.
    #[error("lexer {lexer}: no rule matches at column {column}")]
    NoMatch { lexer: String, column: usize },
}

// ── Lexer trait ───────────────────────────────────────────────────────────────

/// A language-specific tokenizer.
pub trait Lexer: Send + Sync {
    /// Canonical lowercase name, e.g. `"sql"`.
    fn name(&self) -> &str;

    /// Additional names accepted by [`get`].
    fn aliases(&self) -> &[&'static str] {
        &[]
    }

    /// How likely `source` is written in this language, in `[0.0, 1.0]`.
    fn analyse(&self, _source: &str) -> f32 {
        0.0
    }

    /// Tokenize one line.
    fn tokenise(&self, line: &str) -> Result<Vec<Token>, LexError>;
}

/// Fallback lexer: the whole line as one untyped token.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl Lexer for PlainText {
    fn name(&self) -> &str {
        "plaintext"
    }

    fn aliases(&self) -> &[&'static str] {
        &["text", "txt", "plain"]
    }

    fn tokenise(&self, line: &str) -> Result<Vec<Token>, LexError> {
        if line.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Token::new(TokenKind::Text, line)])
    }
}

// ── RegexLexer ────────────────────────────────────────────────────────────────

/// What a rule produces for its match.
#[derive(Clone, Copy)]
pub enum Action {
    /// A fixed kind.
    Emit(TokenKind),
    /// Kind decided from the matched text and the text following it.
    Classify(fn(matched: &str, rest: &str) -> TokenKind),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Emit(kind) => write!(f, "Emit({kind})"),
            Action::Classify(_) => f.write_str("Classify(..)"),
        }
    }
}

#[derive(Debug)]
struct Rule {
    pattern: Regex,
    action: Action,
}

/// A scoring function used by [`Lexer::analyse`].
pub type Analyser = fn(&str) -> f32;

/// An ordered list of anchored regex rules.
pub struct RegexLexer {
    name: &'static str,
    aliases: &'static [&'static str],
    rules: Vec<Rule>,
    analyser: Option<Analyser>,
}

impl RegexLexer {
    /// Compile `rules`.  Each pattern is anchored at the current position;
    /// do not include `^` yourself.
    pub fn new(
        name: &'static str,
        aliases: &'static [&'static str],
        rules: &[(&str, Action)],
    ) -> Result<Self, LexError> {
        let rules = rules
            .iter()
            .map(|&(src, action)| {
                RegexBuilder::new(&format!("^(?:{src})"))
                    .build()
                    .map(|pattern| Rule { pattern, action })
                    .map_err(|source| LexError::InvalidRule { lexer: name, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { name, aliases, rules, analyser: None })
    }

    pub fn with_analyser(mut self, analyser: Analyser) -> Self {
        self.analyser = Some(analyser);
        self
    }
}

impl fmt::Debug for RegexLexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegexLexer")
            .field("name", &self.name)
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl Lexer for RegexLexer {
    fn name(&self) -> &str {
        self.name
    }

    fn aliases(&self) -> &[&'static str] {
        self.aliases
    }

    fn analyse(&self, source: &str) -> f32 {
        self.analyser.map_or(0.0, |f| f(source).clamp(0.0, 1.0))
    }

    fn tokenise(&self, line: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut pos = 0;
        while pos < line.len() {
            let rest = &line[pos..];
            let hit = self.rules.iter().find_map(|rule| {
                rule.pattern
                    .find(rest)
                    .filter(|m| !m.is_empty())
                    .map(|m| (m.end(), rule.action))
            });
            let (len, kind) = match hit {
                Some((len, Action::Emit(kind))) => (len, kind),
                Some((len, Action::Classify(f))) => (len, f(&rest[..len], &rest[len..])),
                None => {
                    // One char, not one byte.
                    let len = rest.chars().next().map_or(1, char::len_utf8);
                    (len, TokenKind::Error)
                }
            };
            tokens.push(Token::new(kind, &rest[..len]));
            pos += len;
        }
        Ok(tokens)
    }
}

// ── SQL ───────────────────────────────────────────────────────────────────────

const SQL_KEYWORDS: &[&str] = &[
    "add", "all", "alter", "and", "as", "asc", "begin", "between", "by", "case",
    "check", "column", "commit", "constraint", "create", "cross", "default",
    "delete", "desc", "distinct", "drop", "else", "end", "exists", "foreign",
    "from", "full", "group", "having", "if", "in", "index", "inner", "insert",
    "into", "is", "join", "key", "left", "like", "limit", "not", "offset", "on",
    "or", "order", "outer", "primary", "references", "right", "rollback",
    "select", "set", "table", "then", "union", "unique", "update", "using",
    "values", "view", "when", "where", "with",
];

const SQL_TYPES: &[&str] = &[
    "bigint", "blob", "boolean", "char", "date", "decimal", "double", "float",
    "int", "integer", "numeric", "real", "smallint", "text", "time",
    "timestamp", "varchar",
];

const SQL_CONSTANTS: &[&str] = &["null", "true", "false"];

const SQL_BUILTINS: &[&str] = &[
    "avg", "coalesce", "count", "lower", "max", "min", "now", "sum", "upper",
];

static SQL_WORDS: LazyLock<[HashSet<&'static str>; 4]> = LazyLock::new(|| {
    [SQL_KEYWORDS, SQL_TYPES, SQL_CONSTANTS, SQL_BUILTINS]
        .map(|words| words.iter().copied().collect())
});

/// Multi-pattern matcher over the SQL keyword list for [`analyse_sql`].
static SQL_KEYWORD_MATCHER: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostLongest)
        .build(SQL_KEYWORDS)
});

fn classify_sql_word(word: &str, _rest: &str) -> TokenKind {
    let lower = word.to_ascii_lowercase();
    let [keywords, types, constants, builtins] = &*SQL_WORDS;
    if keywords.contains(lower.as_str()) {
        TokenKind::Keyword
    } else if types.contains(lower.as_str()) {
        TokenKind::KeywordType
    } else if constants.contains(lower.as_str()) {
        TokenKind::KeywordConstant
    } else if builtins.contains(lower.as_str()) {
        TokenKind::NameBuiltin
    } else {
        TokenKind::Name
    }
}

/// Fraction of words that are SQL keywords, boosted when the text opens
/// with a statement verb.
fn analyse_sql(source: &str) -> f32 {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut words = source.split(|c: char| !is_word(c)).filter(|w| !w.is_empty());
    let first = words.next().unwrap_or("");
    let count = words.count() + usize::from(!first.is_empty());
    if count == 0 {
        return 0.0;
    }
    let hits = SQL_KEYWORD_MATCHER
        .find_iter(source)
        .filter(|m| {
            let before = source[..m.start()].chars().next_back();
            let after = source[m.end()..].chars().next();
            !before.is_some_and(is_word) && !after.is_some_and(is_word)
        })
        .count();
    let mut score = hits as f32 / count as f32;
    if ["select", "insert", "update", "delete", "create", "with"]
        .iter()
        .any(|verb| first.eq_ignore_ascii_case(verb))
    {
        score += 0.3;
    }
    score
}

/// A single-line SQL lexer.
pub fn sql() -> Result<RegexLexer, LexError> {
    use TokenKind::*;
    Ok(RegexLexer::new(
        "sql",
        &["mysql", "postgres", "postgresql", "sqlite"],
        &[
            (r"\s+", Action::Emit(Whitespace)),
            (r"--.*", Action::Emit(CommentSingle)),
            (r"/\*.*?(?:\*/|$)", Action::Emit(CommentMultiline)),
            (r"[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?", Action::Emit(LiteralNumber)),
            (r"'(?:''|[^'])*'?", Action::Emit(LiteralString)),
            (r#""(?:""|[^"])*"?"#, Action::Emit(NameVariable)),
            (r"`[^`]*`?", Action::Emit(NameVariable)),
            (r"[\p{L}_][\p{L}\p{N}_$]*", Action::Classify(classify_sql_word)),
            (r"<>|!=|<=|>=|\|\||::|[-+*/<>=~!@#%^&|?]", Action::Emit(Operator)),
            (r"[;:()\[\],.]", Action::Emit(Punctuation)),
        ],
    )?
    .with_analyser(analyse_sql))
}

// ── JSON ──────────────────────────────────────────────────────────────────────

fn classify_json_string(_matched: &str, rest: &str) -> TokenKind {
    if rest.trim_start().starts_with(':') {
        TokenKind::NameTag
    } else {
        TokenKind::LiteralString
    }
}

fn analyse_json(source: &str) -> f32 {
    match source.trim_start().chars().next() {
        Some('{') | Some('[') => 0.4,
        _ => 0.0,
    }
}

/// A single-line JSON lexer.
pub fn json() -> Result<RegexLexer, LexError> {
    use TokenKind::*;
    Ok(RegexLexer::new(
        "json",
        &["jsonc"],
        &[
            (r"\s+", Action::Emit(Whitespace)),
            (r#""(?:\\.|[^"\\])*"?"#, Action::Classify(classify_json_string)),
            (r"-?[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?", Action::Emit(LiteralNumber)),
            (r"true|false|null", Action::Emit(KeywordConstant)),
            (r"[{}\[\],:]", Action::Emit(Punctuation)),
        ],
    )?
    .with_analyser(analyse_json))
}

// ── Registry ──────────────────────────────────────────────────────────────────

static REGISTRY: LazyLock<Vec<Box<dyn Lexer>>> = LazyLock::new(|| {
    let mut lexers: Vec<Box<dyn Lexer>> = Vec::new();
    for built in [sql(), json()] {
        match built {
            Ok(lexer) => lexers.push(Box::new(lexer)),
            Err(e) => tracing::error!("skipping built-in lexer: {e}"),
        }
    }
    lexers
});

static PLAIN_TEXT: PlainText = PlainText;

/// Names of every registered lexer, plus `"plaintext"`.
pub fn names() -> Vec<&'static str> {
    REGISTRY
        .iter()
        .map(|l| l.name())
        .chain(std::iter::once(PLAIN_TEXT.name()))
        .collect()
}

/// Look up a lexer by name or alias, case-insensitive.
pub fn get(name: &str) -> Option<&'static dyn Lexer> {
    if name.is_empty() {
        return None;
    }
    let matches = |l: &dyn Lexer| {
        l.name().eq_ignore_ascii_case(name)
            || l.aliases().iter().any(|a| a.eq_ignore_ascii_case(name))
    };
    REGISTRY
        .iter()
        .map(|l| &**l)
        .find(|&l| matches(l))
        .or_else(|| matches(&PLAIN_TEXT).then_some(&PLAIN_TEXT as &dyn Lexer))
}

/// The registered lexer that scores `source` highest, if any scores above 0.
pub fn analyse(source: &str) -> Option<&'static dyn Lexer> {
    REGISTRY
        .iter()
        .map(|l| (l.analyse(source), &**l))
        .filter(|(score, _)| *score > 0.0)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, l)| l)
}

/// The lexer of last resort.
pub fn fallback() -> &'static dyn Lexer {
    &PLAIN_TEXT
}

/// Full lookup chain: by name, then by analysis of `source`, then plaintext.
pub fn resolve(name: &str, source: &str) -> &'static dyn Lexer {
    if let Some(lexer) = get(name) {
        return lexer;
    }
    if let Some(lexer) = analyse(source) {
        tracing::debug!(hint = name, chosen = lexer.name(), "lexer picked by analysis");
        return lexer;
    }
    tracing::debug!(hint = name, "no lexer matched; using plaintext");
    fallback()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
        tokens.iter().map(|t| (t.kind, t.text.as_str())).collect()
    }

    fn joined(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    // ── SQL ───────────────────────────────────────────────────────────────────

    #[test]
    fn sql_classifies_keywords_names_and_punctuation() {
        let lexer = sql().unwrap();
        let tokens = lexer.tokenise("select * from tab1;").unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::Keyword, "select"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Operator, "*"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Keyword, "from"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Name, "tab1"),
                (TokenKind::Punctuation, ";"),
            ]
        );
    }

    #[test]
    fn sql_keywords_are_case_insensitive() {
        let tokens = sql().unwrap().tokenise("SELECT Count").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[2].kind, TokenKind::NameBuiltin);
    }

    #[test]
    fn sql_strings_numbers_comments() {
        let tokens = sql().unwrap().tokenise("id=120 and f='èasd' -- note").unwrap();
        let k = kinds(&tokens);
        assert!(k.contains(&(TokenKind::LiteralNumber, "120")));
        assert!(k.contains(&(TokenKind::LiteralString, "'èasd'")));
        assert!(k.contains(&(TokenKind::CommentSingle, "-- note")));
    }

    #[test]
    fn sql_unterminated_string_runs_to_end() {
        let tokens = sql().unwrap().tokenise("x = 'abc").unwrap();
        assert_eq!(tokens.last().unwrap(), &Token::new(TokenKind::LiteralString, "'abc"));
    }

    #[test]
    fn sql_tokens_cover_line_exactly() {
        let line = "where id=120 and f='èasd' /* c */ § ok";
        let tokens = sql().unwrap().tokenise(line).unwrap();
        assert_eq!(joined(&tokens), line);
    }

    #[test]
    fn unknown_char_becomes_error_token() {
        let tokens = sql().unwrap().tokenise("a § b").unwrap();
        assert!(tokens.contains(&Token::new(TokenKind::Error, "§")));
    }

    // ── JSON ──────────────────────────────────────────────────────────────────

    #[test]
    fn json_keys_are_tags() {
        let tokens = json().unwrap().tokenise(r#"{"id": "x", "n": 1}"#).unwrap();
        let k = kinds(&tokens);
        assert!(k.contains(&(TokenKind::NameTag, r#""id""#)));
        assert!(k.contains(&(TokenKind::LiteralString, r#""x""#)));
        assert!(k.contains(&(TokenKind::LiteralNumber, "1")));
    }

    // ── Plain text ────────────────────────────────────────────────────────────

    #[test]
    fn plaintext_yields_whole_line() {
        let tokens = PlainText.tokenise("anything at all").unwrap();
        assert_eq!(kinds(&tokens), vec![(TokenKind::Text, "anything at all")]);
        assert!(PlainText.tokenise("").unwrap().is_empty());
    }

    // ── Coalesce ──────────────────────────────────────────────────────────────

    #[test]
    fn coalesce_merges_adjacent_same_kind() {
        let merged = coalesce(vec![
            Token::new(TokenKind::Error, "§"),
            Token::new(TokenKind::Error, "¤"),
            Token::new(TokenKind::Text, ""),
            Token::new(TokenKind::Name, "a"),
        ]);
        assert_eq!(kinds(&merged), vec![(TokenKind::Error, "§¤"), (TokenKind::Name, "a")]);
    }

    // ── Registry ──────────────────────────────────────────────────────────────

    #[test]
    fn get_by_name_and_alias() {
        assert_eq!(get("SQL").map(|l| l.name()), Some("sql"));
        assert_eq!(get("postgres").map(|l| l.name()), Some("sql"));
        assert_eq!(get("txt").map(|l| l.name()), Some("plaintext"));
        assert!(get("cobol").is_none());
    }

    #[test]
    fn resolve_falls_back_to_analysis() {
        assert_eq!(resolve("", "select a from b").name(), "sql");
        assert_eq!(resolve("nope", "{\"a\": 1}").name(), "json");
    }

    #[test]
    fn resolve_falls_back_to_plaintext() {
        assert_eq!(resolve("nope", "just some words").name(), "plaintext");
    }

    #[test]
    fn sql_analysis_ignores_keywords_inside_words() {
        assert_eq!(analyse_sql("selection fromage"), 0.0);
        assert!(analyse_sql("select x from y") > 0.5);
    }

    #[test]
    fn kind_hierarchy() {
        assert_eq!(TokenKind::KeywordType.parent(), Some(TokenKind::Keyword));
        assert_eq!(TokenKind::LiteralString.parent(), Some(TokenKind::Literal));
        assert_eq!(TokenKind::Keyword.parent(), None);
        assert_eq!(TokenKind::ALL.len(), 18);
    }
}
