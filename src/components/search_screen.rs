use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Padding, ScrollbarStyle, SelectList, SelectListBehavior, SelectListProps,
    SelectListStyle, SelectionStyle, StatusBar, StatusBarHint, StatusBarProps, StatusBarSection,
    StatusBarStyle, TextInput, TextInputProps, TextInputStyle, highlight_substring,
};

use super::{Component, ModeHeader, ModeHeaderProps};
use crate::action::Action;
use crate::state::{AppState, Listing, NoticeKind};

const PLACEHOLDER: &str = "Search for a city...";
const HEADER_HEIGHT: u16 = 4;

pub struct SearchScreen {
    input: TextInput,
    list: SelectList,
}

pub struct SearchScreenProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

impl Default for SearchScreen {
    fn default() -> Self {
        Self {
            input: TextInput::new(),
            list: SelectList::new(),
        }
    }
}

impl SearchScreen {
    pub fn new() -> Self {
        Self::default()
    }

    fn list_items(state: &AppState) -> Vec<Line<'static>> {
        let base = Style::default().fg(Color::Reset);
        match &state.listing {
            Listing::History(places) => {
                let marker = Style::default().fg(Color::DarkGray);
                places
                    .iter()
                    .map(|place| {
                        Line::from(vec![
                            Span::styled("↺ ", marker),
                            Span::styled(place.label.clone(), base),
                            Span::styled(format!("  {:.2}, {:.2}", place.lat, place.lon), marker),
                        ])
                    })
                    .collect()
            }
            Listing::Found(places) => {
                let highlight = Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD);
                places
                    .iter()
                    .map(|place| highlight_substring(&place.label, &state.query, base, highlight))
                    .collect()
            }
        }
    }

    fn list_style() -> SelectListStyle {
        SelectListStyle {
            base: BaseStyle {
                border: None,
                padding: Padding::xy(1, 0),
                bg: None,
                fg: None,
            },
            selection: SelectionStyle::default(),
            scrollbar: ScrollbarStyle::default(),
        }
    }

    fn input_style(bg: Option<Color>) -> TextInputStyle {
        TextInputStyle {
            base: BaseStyle {
                border: None,
                padding: Padding::all(1),
                bg,
                fg: None,
            },
            placeholder_style: None,
            cursor_style: None,
        }
    }

    fn delete_highlighted(state: &AppState) -> Vec<Action> {
        match (&state.listing, state.highlighted_place()) {
            (Listing::History(_), Some(place)) => vec![Action::HistoryDelete(place.label.clone())],
            _ => Vec::new(),
        }
    }
}

impl Component<Action> for SearchScreen {
    type Props<'a> = SearchScreenProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }

        let EventKind::Key(key) = event else {
            return Vec::new();
        };
        let state = props.state;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return vec![Action::Quit],
            KeyCode::Char('c') if ctrl => return vec![Action::Quit],
            KeyCode::Char('l') if ctrl => return vec![Action::CurrentLocationRequest],
            KeyCode::Char('d') if ctrl => return Self::delete_highlighted(state),
            KeyCode::Delete => return Self::delete_highlighted(state),
            KeyCode::F(5) => return vec![Action::QueryRefresh],
            KeyCode::Enter => {
                // Untouched cursor sits on the first row: plain search submit
                if state.highlighted == 0 {
                    return vec![Action::SearchSubmit];
                }
                return vec![Action::ResultSelect(state.highlighted)];
            }
            KeyCode::Down | KeyCode::Up => {
                if state.listing.is_empty() {
                    return Vec::new();
                }
                let items = Self::list_items(state);
                let list_props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.highlighted,
                    is_focused: true,
                    style: Self::list_style(),
                    behavior: SelectListBehavior::default(),
                    on_select: Action::ResultHighlight,
                    render_item: &|item| item.clone(),
                };
                return self
                    .list
                    .handle_event(event, list_props)
                    .into_iter()
                    .collect();
            }
            _ => {}
        }

        // All other keys edit the query
        let input_props = TextInputProps {
            value: &state.query,
            placeholder: PLACEHOLDER,
            is_focused: true,
            style: Self::input_style(None),
            on_change: Action::QueryChange,
            // Enter never reaches the input; TextInputProps still needs a callback
            on_submit: |_| Action::SearchSubmit,
            on_cursor_move: Some(|_| Action::Render),
        };

        self.input
            .handle_event(event, input_props)
            .into_iter()
            .collect()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let chunks = Layout::vertical([
            Constraint::Length(3),             // Input
            Constraint::Length(HEADER_HEIGHT), // Mode title + status
            Constraint::Min(1),                // List
            Constraint::Length(1),             // Notice
            Constraint::Length(1),             // Hints
        ])
        .split(area);

        let input_props = TextInputProps {
            value: &state.query,
            placeholder: PLACEHOLDER,
            is_focused: props.is_focused,
            style: Self::input_style(Some(Color::Rgb(50, 50, 60))),
            on_change: Action::QueryChange,
            on_submit: |_| Action::SearchSubmit, // unused, see handle_event
            on_cursor_move: Some(|_| Action::Render),
        };
        self.input.render(frame, chunks[0], input_props);

        let mut header = ModeHeader;
        header.render(
            frame,
            chunks[1],
            ModeHeaderProps {
                mode: state.mode,
                count: state.listing.len(),
                is_loading: state.is_loading(),
                tick_count: state.tick_count,
            },
        );

        let items = Self::list_items(state);
        let list_props = SelectListProps {
            items: &items,
            count: items.len(),
            selected: state.highlighted,
            is_focused: props.is_focused,
            style: Self::list_style(),
            behavior: SelectListBehavior::default(),
            on_select: Action::ResultHighlight,
            render_item: &|item| item.clone(),
        };
        self.list.render(frame, chunks[2], list_props);

        if let Some(notice) = &state.notice {
            let color = match notice.kind {
                NoticeKind::Info => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            let line = Line::from(Span::styled(
                notice.text.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .centered();
            frame.render_widget(Paragraph::new(line), chunks[3]);
        }

        let history_hints = [
            StatusBarHint::new("enter", "select"),
            StatusBarHint::new("↑↓", "move"),
            StatusBarHint::new("ctrl+d", "delete"),
            StatusBarHint::new("ctrl+l", "current location"),
            StatusBarHint::new("esc", "quit"),
        ];
        let search_hints = [
            StatusBarHint::new("enter", "select"),
            StatusBarHint::new("↑↓", "move"),
            StatusBarHint::new("ctrl+l", "current location"),
            StatusBarHint::new("esc", "quit"),
        ];
        let hints: &[_] = match state.listing {
            Listing::History(_) => &history_hints,
            Listing::Found(_) => &search_hints,
        };
        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[4],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(hints),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}
