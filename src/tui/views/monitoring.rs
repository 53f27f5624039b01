//! Host metrics, recent events and tracked entities

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};

use super::keys::{key, typed};
use super::{View, ViewAction};
use crate::monitor::{DataOrigin, MonitorSnapshot};
use crate::tui::context::SharedContext;
use crate::tui::message::Message;
use crate::tui::theme::Theme;

#[derive(Debug, Default)]
pub struct MonitoringView {
    snapshot: Option<MonitorSnapshot>,
    loading: bool,
    error: Option<String>,
}

impl MonitoringView {
    pub fn snapshot(&self) -> Option<&MonitorSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn request(&mut self) -> ViewAction {
        if self.loading {
            return ViewAction::None;
        }
        self.loading = true;
        ViewAction::FetchMonitoring
    }
}

impl View for MonitoringView {
    fn init(&mut self, _ctx: &mut SharedContext) -> ViewAction {
        self.request()
    }

    fn update(&mut self, msg: &Message, _ctx: &mut SharedContext) -> ViewAction {
        match msg {
            Message::MonitoringLoaded(Ok(snapshot)) => {
                self.loading = false;
                self.error = None;
                self.snapshot = Some(snapshot.clone());
                ViewAction::None
            }
            Message::MonitoringLoaded(Err(e)) => {
                self.loading = false;
                self.error = Some(e.clone());
                ViewAction::None
            }
            _ => {
                let Some(key) = key(msg) else {
                    return ViewAction::None;
                };
                match (key.code, typed(key)) {
                    (KeyCode::Esc, _) | (_, Some('q')) => ViewAction::Back,
                    (_, Some('r')) => self.request(),
                    _ => ViewAction::None,
                }
            }
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &SharedContext, theme: &Theme) {
        let Some(snapshot) = &self.snapshot else {
            let text = match (&self.error, self.loading) {
                (Some(e), _) => Span::styled(e.clone(), theme.failure_style()),
                (None, true) => Span::styled("Loading…", theme.running_style()),
                (None, false) => Span::styled("No data", theme.muted_style()),
            };
            frame.render_widget(
                Paragraph::new(text).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(theme.border_style(true))
                        .title(" Monitoring "),
                ),
                area,
            );
            return;
        };

        // origin line, two borders, at least one row left for events
        let gauge_rows = u16::try_from(snapshot.metrics.len())
            .unwrap_or(u16::MAX)
            .min(area.height.saturating_sub(4));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(gauge_rows.saturating_add(2)),
                Constraint::Min(3),
            ])
            .split(area);

        let origin = match &snapshot.origin {
            DataOrigin::Live => Span::styled(
                format!(" live · {}", snapshot.fetched_at.format("%H:%M:%S")),
                theme.success_style(),
            ),
            DataOrigin::Synthetic { reason } => Span::styled(
                format!(" synthetic · {}", reason),
                Style::default().fg(theme.status_warning),
            ),
        };
        let origin = if self.loading {
            Line::from(vec![origin, Span::styled("  refreshing…", theme.muted_style())])
        } else {
            Line::from(origin)
        };
        frame.render_widget(Paragraph::new(origin), chunks[0]);

        // metrics
        let metrics_block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(false))
            .title(" Metrics ");
        let inner = metrics_block.inner(chunks[1]);
        frame.render_widget(metrics_block, chunks[1]);
        for (i, metric) in snapshot.metrics.iter().enumerate() {
            if i >= inner.height as usize {
                break;
            }
            let row = Rect::new(inner.x, inner.y + i as u16, inner.width, 1);
            if metric.unit == "%" {
                let ratio = (metric.value / 100.0).clamp(0.0, 1.0);
                let color = if ratio > 0.85 {
                    theme.status_failed
                } else if ratio > 0.65 {
                    theme.status_warning
                } else {
                    theme.status_success
                };
                frame.render_widget(
                    Gauge::default()
                        .ratio(ratio)
                        .gauge_style(Style::default().fg(color))
                        .label(format!("{} {:.1}%", metric.name, metric.value)),
                    row,
                );
            } else {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        format!("{} {} {}", metric.name, metric.value, metric.unit),
                        theme.text_style(),
                    )),
                    row,
                );
            }
        }

        // events | entities
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2]);

        let events: Vec<ListItem> = snapshot
            .events
            .iter()
            .map(|e| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", e.timestamp), theme.muted_style()),
                    Span::styled(e.message.clone(), theme.severity_style(e.severity)),
                ]))
            })
            .collect();
        frame.render_widget(
            List::new(events).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style(false))
                    .title(" Events "),
            ),
            bottom[0],
        );

        let entities: Vec<ListItem> = snapshot
            .entities
            .iter()
            .map(|e| {
                let style = if e.status == "running" || e.status == "ok" {
                    theme.success_style()
                } else {
                    theme.failure_style()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<12}", e.id), theme.text_style()),
                    Span::styled(e.status.clone(), style),
                ]))
            })
            .collect();
        frame.render_widget(
            List::new(entities).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style(false))
                    .title(" Entities "),
            ),
            bottom[1],
        );
    }

    fn status_line(&self, _ctx: &SharedContext) -> String {
        "[r] Refresh  [Esc] Back".to_string()
    }
}
