use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::App;
use super::view_model::{ControlLabel, PageView, UiModal, UiView};

pub(crate) fn draw(f: &mut ratatui::Frame, app: &mut App) {
    let view = UiView::from_app(app);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(8), Constraint::Length(7)])
        .split(f.area());

    let header = Paragraph::new(
        view.header_lines
            .iter()
            .map(|l| Line::from(l.as_str()))
            .collect::<Vec<_>>(),
    )
    .block(Block::default().borders(Borders::ALL).title("Podcastr"));
    f.render_widget(header, chunks[0]);

    let mid_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    match &view.page {
        PageView::Home {
            latest,
            all,
            selected,
        } => {
            app.list_view_height = draw_home(f, mid_chunks[0], latest, all, *selected);
        }
        PageView::Episode {
            title,
            lines,
            scroll,
        } => {
            let body = lines.join("\n");
            let detail = Paragraph::new(body)
                .block(Block::default().borders(Borders::ALL).title(title.as_str()))
                .wrap(Wrap { trim: false })
                .scroll((*scroll, 0));
            f.render_widget(detail, mid_chunks[0]);
        }
    }

    let panel_width = mid_chunks[1].width.saturating_sub(2) as usize;
    let panel = Paragraph::new(
        view.player_panel
            .lines
            .iter()
            .map(|l| Line::from(truncate_label(l, panel_width)))
            .collect::<Vec<_>>(),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(view.player_panel.title.as_str()),
    );
    f.render_widget(panel, mid_chunks[1]);

    let footer_block = Block::default().borders(Borders::ALL).title("Player");
    let footer_inner = footer_block.inner(chunks[2]);
    f.render_widget(footer_block, chunks[2]);

    let footer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(footer_inner);

    f.render_widget(
        Paragraph::new(Line::from(view.status_line.as_str())),
        footer_chunks[0],
    );

    let gauge_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(10),
            Constraint::Min(10),
            Constraint::Length(10),
        ])
        .split(footer_chunks[1]);
    let dim = if view.progress.enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    f.render_widget(
        Paragraph::new(Line::from(view.progress.elapsed.as_str())).style(dim),
        gauge_chunks[0],
    );
    let gauge = Gauge::default()
        .ratio(view.progress.ratio)
        .label("")
        .gauge_style(if view.progress.enabled {
            Style::default().fg(Color::Green).bg(Color::Black)
        } else {
            Style::default().fg(Color::DarkGray).bg(Color::Black)
        });
    f.render_widget(gauge, gauge_chunks[1]);
    f.render_widget(
        Paragraph::new(Line::from(view.progress.total.as_str()))
            .style(dim)
            .alignment(Alignment::Right),
        gauge_chunks[2],
    );

    f.render_widget(
        Paragraph::new(controls_line(&view.controls)).alignment(Alignment::Center),
        footer_chunks[2],
    );
    f.render_widget(
        Paragraph::new(Line::from(truncate_label(
            &view.keys_line,
            footer_chunks[3].width as usize,
        ))),
        footer_chunks[3],
    );

    match view.active_modal {
        Some(UiModal::Help { title, body, layout }) => {
            let area = centered_rect(layout.width_pct, layout.height_pct, f.area());
            f.render_widget(Clear, area);
            let block = Block::default().title(title).borders(Borders::ALL);
            f.render_widget(Paragraph::new(body).block(block), area);
        }
        Some(UiModal::Logs { title, empty, layout }) => {
            let area = centered_rect(layout.width_pct, layout.height_pct, f.area());
            f.render_widget(Clear, area);
            let block = Block::default().borders(Borders::ALL).title(title);
            let inner = block.inner(area);
            let height = inner.height as usize;
            let total = app.logs.len();
            let end = total.saturating_sub(app.logs_scroll);
            let start = end.saturating_sub(height);
            let mut items: Vec<ListItem> = app
                .logs
                .iter()
                .skip(start)
                .take(end.saturating_sub(start))
                .map(|line| ListItem::new(line.clone()))
                .collect();
            if empty {
                items.push(ListItem::new("<no logs>"));
            }
            f.render_widget(List::new(items).block(block), area);
        }
        None => {}
    }
}

/// Draw both home sections; returns the visible height of the "All episodes" list.
fn draw_home(
    f: &mut ratatui::Frame,
    area: Rect,
    latest: &[String],
    all: &[String],
    selected: Option<usize>,
) -> usize {
    let latest_height = (latest.len().max(1) as u16 + 2).min(area.height / 2);
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(latest_height), Constraint::Min(3)])
        .split(area);

    let mut latest_state = ListState::default();
    let mut all_state = ListState::default();
    match selected {
        Some(idx) if idx < latest.len() => latest_state.select(Some(idx)),
        Some(idx) => all_state.select(Some(idx - latest.len())),
        None => {}
    }

    let width = area.width.saturating_sub(4) as usize;
    let latest_list = episode_list("Latest releases", latest, width);
    f.render_stateful_widget(latest_list, sections[0], &mut latest_state);

    let all_block = Block::default().borders(Borders::ALL).title("All episodes");
    let height = all_block.inner(sections[1]).height as usize;
    let all_list = episode_list("All episodes", all, width);
    f.render_stateful_widget(all_list, sections[1], &mut all_state);
    height
}

fn episode_list<'a>(title: &'a str, labels: &[String], width: usize) -> List<'a> {
    let items: Vec<ListItem> = if labels.is_empty() {
        vec![ListItem::new("<empty>")]
    } else {
        labels
            .iter()
            .map(|label| ListItem::new(truncate_label(label, width)))
            .collect()
    };
    List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ")
}

fn controls_line(controls: &[ControlLabel]) -> Line<'static> {
    let mut spans = Vec::with_capacity(controls.len() * 2);
    for (i, control) in controls.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let style = if !control.state.enabled {
            Style::default().fg(Color::DarkGray)
        } else if control.state.active {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("[ {} ]", control.label), style));
    }
    Line::from(spans)
}

fn truncate_label(label: &str, max: usize) -> String {
    let count = label.chars().count();
    if max == 0 || count <= max {
        return label.to_string();
    }
    if max <= 3 {
        return label.chars().take(max).collect();
    }
    let mut out: String = label.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1]);
    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_label("episódio", 20), "episódio");
        assert_eq!(truncate_label("importância da contribuição", 10), "importâ...");
        assert_eq!(truncate_label("abc", 0), "abc");
        assert_eq!(truncate_label("abcdef", 2), "ab");
    }

    #[test]
    fn centered_rect_stays_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(60, 50, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 20);
        assert_eq!(inner.y, 10);
    }
}
