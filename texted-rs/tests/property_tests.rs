use proptest::prelude::*;
use texted::attr::StyleEntry;
use texted::buffer::{Buffer, MAX_LINES};
use texted::lexer;
use texted::render::{Renderer, DEFAULT_CARET_STYLE};
use texted::theme;

/// One buffer operation, with raw (possibly out-of-range) coordinates.
#[derive(Debug, Clone)]
enum Op {
    Insert(usize, usize, char),
    Split(usize, usize),
    Merge(usize),
    DeleteBackward(usize, usize),
    DeleteForward(usize, usize),
    Replace(usize, usize, usize, String),
    Left(bool),
    Right,
    Up,
    Down,
    Home,
    End,
    SetPosition(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    let idx = 0usize..12;
    let ch = prop_oneof![prop::char::range('a', 'z'), Just('è')];
    let movement = prop_oneof![
        Just(Op::Right),
        Just(Op::Up),
        Just(Op::Down),
        Just(Op::Home),
        Just(Op::End),
    ];
    prop_oneof![
        (idx.clone(), idx.clone(), ch).prop_map(|(r, c, ch)| Op::Insert(r, c, ch)),
        (idx.clone(), idx.clone()).prop_map(|(r, c)| Op::Split(r, c)),
        idx.clone().prop_map(Op::Merge),
        (idx.clone(), idx.clone()).prop_map(|(r, c)| Op::DeleteBackward(r, c)),
        (idx.clone(), idx.clone()).prop_map(|(r, c)| Op::DeleteForward(r, c)),
        (idx.clone(), idx.clone(), idx.clone(), "[a-z]{0,3}")
            .prop_map(|(r, s, e, t)| Op::Replace(r, s, e, t)),
        any::<bool>().prop_map(Op::Left),
        movement,
        (idx.clone(), idx).prop_map(|(r, c)| Op::SetPosition(r, c)),
    ]
}

fn apply(buf: &mut Buffer, op: &Op) {
    match op.clone() {
        Op::Insert(r, c, ch) => {
            buf.insert_char(r, c, ch);
        }
        Op::Split(r, c) => {
            buf.split_line(r, c);
        }
        Op::Merge(r) => {
            buf.merge_line_above(r);
        }
        Op::DeleteBackward(r, c) => {
            buf.delete_backward(r, c);
        }
        Op::DeleteForward(r, c) => {
            buf.delete_forward(r, c);
        }
        Op::Replace(r, s, e, t) => buf.replace_range(r, s, e, &t),
        Op::Left(stay) => {
            buf.move_left(stay);
        }
        Op::Right => {
            buf.move_right();
        }
        Op::Up => {
            buf.move_up();
        }
        Op::Down => {
            buf.move_down();
        }
        Op::Home => {
            buf.move_home();
        }
        Op::End => {
            buf.move_end();
        }
        Op::SetPosition(r, c) => {
            buf.set_position(r, c);
        }
    }
}

fn buffer_of(lines: &[String]) -> Buffer {
    let mut buf = Buffer::new();
    buf.set_value(&lines.join("\n"));
    buf
}

proptest! {
    /// `value()` gives back what `set_value` got, minus one trailing newline.
    #[test]
    fn value_round_trip(s in "[a-zè *=']{0,8}(\n[a-zè *=']{0,8}){0,20}\n?") {
        let mut buf = Buffer::new();
        buf.set_value(&s);
        let expected = s.strip_suffix('\n').unwrap_or(&s);
        prop_assert_eq!(buf.value(), expected);
    }
}

proptest! {
    /// Splitting a line and merging the tail back restores the text.
    #[test]
    fn split_then_merge_is_identity(
        lines in prop::collection::vec("[a-zè ]{0,10}", 1..10),
        row in any::<prop::sample::Index>(),
        col in 0usize..14,
    ) {
        let mut buf = buffer_of(&lines);
        let before = buf.value();
        let count = buf.line_count();
        let row = row.index(count);

        prop_assert!(buf.split_line(row, col));
        prop_assert_eq!(buf.line_count(), count + 1);
        prop_assert!(buf.merge_line_above(row + 1));
        prop_assert_eq!(buf.value(), before);
        prop_assert_eq!(buf.line_count(), count);
    }
}

proptest! {
    /// The caret stays legal and the line cap holds under any edit sequence.
    #[test]
    fn cursor_stays_legal(ops in prop::collection::vec(op(), 0..80)) {
        let mut buf = Buffer::new();
        for op in &ops {
            apply(&mut buf, op);
            let pos = buf.position();
            prop_assert!(buf.line_count() >= 1);
            prop_assert!(buf.line_count() <= MAX_LINES);
            prop_assert!(pos.row < buf.line_count(), "{op:?} left row {}", pos.row);
            prop_assert!(pos.col <= buf.line_len(pos.row), "{op:?} left col {}", pos.col);
        }
    }
}

proptest! {
    /// Down then up on equal-length lines returns to the start.
    #[test]
    fn down_up_round_trip(rows in 2usize..12, len in 0usize..10, r in any::<prop::sample::Index>(), c in any::<prop::sample::Index>()) {
        let lines: Vec<String> = (0..rows).map(|_| "x".repeat(len)).collect();
        let mut buf = buffer_of(&lines);
        // All-empty lines join to text ending in '\n', which loses one row.
        let n = buf.line_count();
        prop_assume!(n >= 2);
        let row = r.index(n - 1);
        let col = c.index(len + 1);
        buf.set_position(row, col);

        buf.move_down();
        buf.move_up();
        prop_assert_eq!((buf.position().row, buf.position().col), (row, col));
    }
}

proptest! {
    /// Every line renders through the SQL lexer, and shows exactly one caret
    /// cell when the caret is on it and none otherwise.
    #[test]
    fn render_places_at_most_one_caret(line in "[a-zA-Z0-9 è'\"=*,.()<>;-]{0,30}", col in 0usize..34, with_caret in any::<bool>()) {
        let sql = lexer::resolve("sql", "");
        let renderer = Renderer::new(theme::resolve("monokai"), DEFAULT_CARET_STYLE);
        let caret = with_caret.then_some(col);

        let out = renderer.highlight(&line, sql, caret);
        prop_assert!(out.is_ok(), "render failed: {:?}", out);
        let out = out.unwrap();
        prop_assert_eq!(out.caret_count(), usize::from(with_caret));

        // The visible text is the line, plus a blank cell when the caret
        // sits past its end.
        let len = line.chars().count();
        let mut expected = line.clone();
        if caret.is_some_and(|c| c >= len) {
            expected.push(' ');
        }
        prop_assert_eq!(out.text(), expected);
        prop_assert!(out.to_ansi().is_ok());
    }
}

proptest! {
    /// A renderer with the zero caret style still places one caret cell.
    #[test]
    fn unstyled_caret_still_counts(line in "[a-z ]{0,10}", col in 0usize..12) {
        let renderer = Renderer::new(theme::resolve("bw"), StyleEntry::ZERO);
        let out = renderer.highlight(&line, lexer::fallback(), Some(col)).unwrap();
        prop_assert_eq!(out.caret_count(), 1);
    }
}
