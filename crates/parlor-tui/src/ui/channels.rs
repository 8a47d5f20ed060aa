//! Channel sidebar
//!
//! Groups first, then direct-message contacts with presence dots and
//! unread badges.

use parlor_app::{Presence, ReadModel};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const ACTIVE_PREFIX: &str = ">";
const INACTIVE_PREFIX: &str = " ";
const DOT_ONLINE: &str = "●";
const DOT_OFFLINE: &str = "○";

/// Render the channel sidebar.
pub fn render(frame: &mut Frame, model: &ReadModel, area: Rect) {
    let mut items: Vec<ListItem> = Vec::new();

    for group in &model.groups {
        items.push(row(group.active, None, &group.name, group.unread));
    }
    for contact in &model.roster {
        let dot = match contact.user.presence {
            Presence::Online => Span::styled(DOT_ONLINE, Style::default().fg(Color::Green)),
            Presence::Offline | Presence::Unknown => {
                Span::styled(DOT_OFFLINE, Style::default().fg(Color::DarkGray))
            },
        };
        items.push(row(contact.active, Some(dot), &contact.user.display_name, contact.unread));
    }

    let block = Block::default().borders(Borders::ALL).title(" Channels ");
    frame.render_widget(List::new(items).block(block), area);
}

fn row(active: bool, dot: Option<Span<'static>>, name: &str, unread: u32) -> ListItem<'static> {
    let (prefix, style) = if active {
        (ACTIVE_PREFIX, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        (INACTIVE_PREFIX, Style::default())
    };

    let mut spans = vec![Span::raw(prefix)];
    if let Some(dot) = dot {
        spans.push(dot);
        spans.push(Span::raw(" "));
    } else {
        spans.push(Span::raw("# "));
    }
    spans.push(Span::styled(name.to_owned(), style));
    if unread > 0 {
        spans.push(Span::styled(format!(" ({unread})"), Style::default().fg(Color::Red)));
    }

    ListItem::new(Line::from(spans))
}
