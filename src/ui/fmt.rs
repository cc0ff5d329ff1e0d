//! Terminal rendering of the panel tree.
//!
//! Walks the retained tree and writes one colored line per card and commit
//! row. Animation marks translate into text styles: a flashing field renders
//! bold, an exiting card renders dimmed until it is swept.

use crate::{
    constants::{
        BOTTOM_LEFT_BOX, BRANCH_COLOR, CHANGE_COLOR, CURRENT_COLOR, ERROR_COLOR, FILLED_CIRCLE,
        RESTACK_COLOR, SHA_COLOR, VERTICAL_BOX,
    },
    ui::UiNode,
};
use nu_ansi_term::Style;
use std::fmt::{self, Display, Write};

/// Writes the panel tree to the given [Write]r.
pub fn write_panel<W: Write>(w: &mut W, root: &UiNode) -> fmt::Result {
    if let Some(empty) = root.child("empty") {
        if let Some(text) = empty.text.as_deref() {
            writeln!(w, "{}", ERROR_COLOR.italic().paint(text))?;
        }
    }

    let Some(stack) = root.child("stack") else {
        return Ok(());
    };

    let count = stack.children.len();
    for (index, card) in stack.children.iter().enumerate() {
        let connection = if index + 1 == count {
            BOTTOM_LEFT_BOX
        } else {
            VERTICAL_BOX
        };
        writeln!(w, "{}", card_line(card, connection))?;
        write_commits(w, card)?;
    }

    Ok(())
}

fn write_commits<W: Write>(w: &mut W, card: &UiNode) -> fmt::Result {
    if let Some(list) = card.child("commits") {
        for row in &list.children {
            let sha = row
                .child("sha")
                .and_then(|node| node.text.as_deref())
                .unwrap_or_default();
            let subject = row
                .child("subject")
                .and_then(|node| node.text.as_deref())
                .unwrap_or_default();
            let flashing = row.is_flashing()
                || row.child("sha").is_some_and(UiNode::is_flashing)
                || row.child("subject").is_some_and(UiNode::is_flashing);
            let mut sha_style = SHA_COLOR.normal();
            if flashing {
                sha_style = sha_style.bold();
            }
            writeln!(
                w,
                "{}   {} {}",
                VERTICAL_BOX,
                sha_style.paint(sha),
                subject
            )?;
        }
    }

    if let Some(more) = card.child("more") {
        if let Some(text) = more.text.as_deref() {
            writeln!(
                w,
                "{}   {}",
                VERTICAL_BOX,
                Style::new().dimmed().paint(format!("… {text}"))
            )?;
        }
    }

    Ok(())
}

/// Renders the single summary line of one branch card.
fn card_line(card: &UiNode, connection: char) -> String {
    let header = card.child("header");
    let glyph = header
        .and_then(|row| row.child("status"))
        .and_then(|node| node.text.clone())
        .unwrap_or_default();
    let current = glyph.starts_with(FILLED_CIRCLE);

    let name_node = header.and_then(|row| row.child("name"));
    let name = name_node
        .and_then(|node| node.text.as_deref())
        .unwrap_or(card.key.as_str());

    let mut name_style = if current {
        CURRENT_COLOR.bold()
    } else {
        BRANCH_COLOR.normal()
    };
    if name_node.is_some_and(UiNode::is_flashing) {
        name_style = name_style.bold();
    }
    if card.is_exiting() {
        name_style = name_style.dimmed();
    }

    let mut line = format!(
        "{} {} {}",
        connection,
        name_style.paint(glyph),
        name_style.paint(name)
    );

    if let Some(badge) = header.and_then(|row| row.child("restack")) {
        let text = badge.text.as_deref().unwrap_or("needs restack");
        let mut style = RESTACK_COLOR.normal();
        if badge.is_flashing() {
            style = style.bold();
        }
        let _ = write!(line, " {}", style.paint(format!("({text})")));
    }

    if let Some(chip) = header.and_then(|row| row.child("change")) {
        if let Some(text) = chip.text.as_deref() {
            let mut style = CHANGE_COLOR.italic();
            if chip.is_flashing() {
                style = style.bold();
            }
            let _ = write!(line, " {}", style.paint(format!("({text})")));
        }
    }

    if card.child("pending").is_some() {
        let _ = write!(
            line,
            " {}",
            RESTACK_COLOR.paint("(move pending: apply or cancel)")
        );
    }

    line
}

/// A card summary line paired with its branch name, which implements
/// [Display]. Useful when creating prompts with [inquire::Select].
#[derive(Debug, Clone)]
pub struct DisplayLine {
    /// The rendered line.
    pub line: String,
    /// The branch name corresponding to the line.
    pub branch_name: String,
}

impl Display for DisplayLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.line)
    }
}

/// Gathers one selectable [DisplayLine] per live card, top of stack first.
pub fn display_lines(root: &UiNode) -> Vec<DisplayLine> {
    let Some(stack) = root.child("stack") else {
        return Vec::new();
    };

    let live: Vec<&UiNode> = stack.live_children().collect();
    let count = live.len();
    live.into_iter()
        .enumerate()
        .map(|(index, card)| {
            let connection = if index + 1 == count {
                BOTTOM_LEFT_BOX
            } else {
                VERTICAL_BOX
            };
            DisplayLine {
                line: card_line(card, connection),
                branch_name: card.key.clone(),
            }
        })
        .collect()
}
