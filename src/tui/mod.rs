//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel (company, date range, importer
//! multiselect, country filters, quantity unit, drill-down picks) and a tabbed
//! content area with every dashboard section. Each settings change reruns one
//! dashboard pass over the cached company dataset.

use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs},
};
use tracing::{info, warn};

use crate::analysis::{self, FilterOptions, GroupKey};
use crate::app::pipeline::{DashboardView, ViewSelections, build_view, filter_from_config};
use crate::data::{CsvDirectory, Dataset, DatasetCache, resolve_companies};
use crate::domain::{
    CountryFilter, DashboardConfig, DateRange, Drilldown, FilterSpec, ImporterSelection, RankedRow,
};
use crate::error::AppError;
use crate::report::{fmt_amount, fmt_percent, fmt_quantity, growth_rows, truncate};

mod plotters_chart;

use plotters_chart::SeriesChart;

/// Rows moved per PageUp/PageDown in the shipment table.
const TABLE_PAGE: usize = 10;

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(&config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Company,
    Start,
    End,
    Importers,
    ImporterCountry,
    OriginCountry,
    Unit,
    Product,
    DrillImporter,
}

impl Field {
    const ALL: [Field; 9] = [
        Field::Company,
        Field::Start,
        Field::End,
        Field::Importers,
        Field::ImporterCountry,
        Field::OriginCountry,
        Field::Unit,
        Field::Product,
        Field::DrillImporter,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Rankings,
    Series,
    Countries,
    Units,
    Table,
    Trend,
    Drilldown,
}

impl Tab {
    const ALL: [Tab; 7] = [
        Tab::Rankings,
        Tab::Series,
        Tab::Countries,
        Tab::Units,
        Tab::Table,
        Tab::Trend,
        Tab::Drilldown,
    ];

    fn title(self) -> &'static str {
        match self {
            Tab::Rankings => "Rankings",
            Tab::Series => "Time series",
            Tab::Countries => "Countries",
            Tab::Units => "Units",
            Tab::Table => "KPIs & table",
            Tab::Trend => "Trend",
            Tab::Drilldown => "Drill-down",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn step(self, delta: isize) -> Self {
        let n = Self::ALL.len() as isize;
        Self::ALL[(self.index() as isize + delta).rem_euclid(n) as usize]
    }
}

struct App {
    companies: Vec<String>,
    company_idx: usize,
    cache: DatasetCache<CsvDirectory>,
    dataset: Option<Arc<Dataset>>,
    /// Dataset min/max arrival days.
    bounds: Option<DateRange>,
    range: Option<DateRange>,
    date_input: String,
    editing: Option<Field>,
    options: FilterOptions,
    importer_cursor: usize,
    selected_importers: BTreeSet<String>,
    importer_country: CountryFilter,
    origin_country: CountryFilter,
    selections: ViewSelections,
    selected_field: usize,
    tab: Tab,
    table_offset: usize,
    status: String,
    view: Option<DashboardView>,
}

impl App {
    fn new(config: &DashboardConfig) -> Self {
        let mut companies = resolve_companies(&config.companies, &config.data_dir);
        let company_idx = match &config.company {
            Some(wanted) => match companies.iter().position(|c| c.eq_ignore_ascii_case(wanted)) {
                Some(idx) => idx,
                None => {
                    companies.push(wanted.clone());
                    companies.len() - 1
                }
            },
            None => 0,
        };

        let mut app = Self {
            companies,
            company_idx,
            cache: DatasetCache::new(CsvDirectory::new(config.data_dir.clone())),
            dataset: None,
            bounds: None,
            range: None,
            date_input: String::new(),
            editing: None,
            options: FilterOptions::default(),
            importer_cursor: 0,
            selected_importers: BTreeSet::new(),
            importer_country: CountryFilter::All,
            origin_country: CountryFilter::All,
            selections: ViewSelections {
                unit: config.unit,
                product: config.product.clone(),
                importer: config.drill_importer.clone(),
            },
            selected_field: 0,
            tab: Tab::Rankings,
            table_offset: 0,
            status: String::new(),
            view: None,
        };
        app.load_selected(Some(config));
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn field(&self) -> Field {
        Field::ALL[self.selected_field.min(Field::ALL.len() - 1)]
    }

    fn company(&self) -> &str {
        self.companies
            .get(self.company_idx)
            .map(String::as_str)
            .unwrap_or("-")
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        if self.editing.is_some() {
            return self.handle_date_edit(code);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field + 1 < Field::ALL.len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                if let Some(current) = self.date_of(self.field()) {
                    self.editing = Some(self.field());
                    self.date_input = current.format("%Y-%m-%d").to_string();
                    self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
                }
            }
            KeyCode::Char(' ') if self.field() == Field::Importers => self.toggle_importer(),
            KeyCode::Char('a') => {
                self.selected_importers = self.options.importers.iter().cloned().collect();
                self.recompute();
                self.status = format!("Selected all {} importers.", self.selected_importers.len());
            }
            KeyCode::Char('n') => {
                self.selected_importers.clear();
                self.recompute();
                self.status = "Cleared importer selection.".to_string();
            }
            KeyCode::Tab => self.tab = self.tab.step(1),
            KeyCode::BackTab => self.tab = self.tab.step(-1),
            KeyCode::PageDown => self.scroll_table(TABLE_PAGE as isize),
            KeyCode::PageUp => self.scroll_table(-(TABLE_PAGE as isize)),
            _ => {}
        }

        Ok(false)
    }

    fn handle_date_edit(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                if let Some(field) = self.editing.take() {
                    self.apply_date_input(field);
                }
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn date_of(&self, field: Field) -> Option<NaiveDate> {
        let range = self.range?;
        match field {
            Field::Start => Some(range.start),
            Field::End => Some(range.end),
            _ => None,
        }
    }

    fn adjust_field(&mut self, delta: isize) {
        match self.field() {
            Field::Company => {
                let n = self.companies.len() as isize;
                if n == 0 {
                    return;
                }
                self.company_idx = (self.company_idx as isize + delta).rem_euclid(n) as usize;
                self.load_selected(None);
            }
            field @ (Field::Start | Field::End) => {
                let Some(current) = self.date_of(field) else {
                    return;
                };
                let shifted = if delta >= 0 {
                    current.checked_add_days(Days::new(1))
                } else {
                    current.checked_sub_days(Days::new(1))
                };
                if let Some(day) = shifted {
                    self.set_date(field, day);
                }
            }
            Field::Importers => {
                let n = self.options.importers.len() as isize;
                if n > 0 {
                    self.importer_cursor = (self.importer_cursor as isize + delta).rem_euclid(n) as usize;
                }
            }
            Field::ImporterCountry => {
                self.importer_country = cycle_country(&self.options.importer_countries, &self.importer_country, delta);
                self.recompute();
                self.status = format!("importer country: {}", self.importer_country.label());
            }
            Field::OriginCountry => {
                self.origin_country = cycle_country(&self.options.origin_countries, &self.origin_country, delta);
                self.recompute();
                self.status = format!("exporter country: {}", self.origin_country.label());
            }
            Field::Unit => {
                self.selections.unit = if delta >= 0 {
                    self.selections.unit.next()
                } else {
                    self.selections.unit.prev()
                };
                self.recompute();
                self.status = format!("unit: {}", self.selections.unit);
            }
            Field::Product => {
                let choices = self.choices(GroupKey::Product);
                self.selections.product = cycle(&choices, self.selections.product.as_deref(), delta);
                self.recompute();
            }
            Field::DrillImporter => {
                let choices = self.choices(GroupKey::Importer);
                self.selections.importer = cycle(&choices, self.selections.importer.as_deref(), delta);
                self.recompute();
            }
        }
    }

    fn choices(&self, key: GroupKey) -> Vec<String> {
        self.view
            .as_ref()
            .map(|v| analysis::distinct_values(&v.records, key))
            .unwrap_or_default()
    }

    fn toggle_importer(&mut self) {
        let Some(name) = self.options.importers.get(self.importer_cursor).cloned() else {
            return;
        };
        if !self.selected_importers.remove(&name) {
            self.selected_importers.insert(name);
        }
        self.recompute();
        self.status = format!("{} importer(s) selected.", self.selected_importers.len());
    }

    fn scroll_table(&mut self, delta: isize) {
        let len = self.view.as_ref().map(|v| v.records.len()).unwrap_or(0);
        let next = (self.table_offset as isize + delta).max(0) as usize;
        self.table_offset = next.min(len.saturating_sub(1));
    }

    fn apply_date_input(&mut self, field: Field) {
        let trimmed = self.date_input.trim().to_string();
        match NaiveDate::parse_from_str(&trimmed, "%Y-%m-%d") {
            Ok(day) => self.set_date(field, day),
            Err(e) => self.status = format!("Invalid date '{trimmed}': {e}"),
        }
    }

    /// Move one end of the range, clamped to the dataset bounds.
    fn set_date(&mut self, field: Field, day: NaiveDate) {
        let (Some(bounds), Some(range)) = (self.bounds, self.range) else {
            return;
        };
        let wanted = match field {
            Field::Start => DateRange::new(day, range.end),
            _ => DateRange::new(range.start, day),
        };
        let clamped = wanted.clamped_to(bounds);
        self.status = if clamped == wanted {
            format!("dates: {clamped}")
        } else {
            format!("dates: {clamped} (clamped to {bounds})")
        };
        self.range = Some(clamped);
        self.refresh_options();
        self.recompute();
    }

    /// Load the selected company through the cache and reset the filters.
    ///
    /// `initial` carries the launch flags; they only apply to the first load.
    fn load_selected(&mut self, initial: Option<&DashboardConfig>) {
        let company = self.company().to_string();

        self.dataset = None;
        self.bounds = None;
        self.range = None;
        self.view = None;
        self.options = FilterOptions::default();
        self.selected_importers.clear();
        self.importer_cursor = 0;
        self.table_offset = 0;

        let dataset = match self.cache.get_or_load(&company) {
            Ok(dataset) => dataset,
            Err(err) => {
                warn!(company = %company, "load failed: {err}");
                self.status = err.to_string();
                return;
            }
        };

        let Some(bounds) = dataset.date_bounds() else {
            self.status = format!("No readable shipment rows for company '{company}'.");
            self.dataset = Some(dataset);
            return;
        };

        let filter = initial
            .and_then(|config| filter_from_config(&dataset, config))
            .unwrap_or_else(|| FilterSpec::for_range(bounds));

        self.status = format!(
            "Loaded {company}: {} rows ({} skipped)",
            dataset.records.len(),
            dataset.row_errors.len()
        );
        info!(company = %company, rows = dataset.records.len(), "opened company");

        self.dataset = Some(dataset);
        self.bounds = Some(bounds);
        self.range = Some(filter.date_range);
        self.importer_country = filter.importer_country.clone();
        self.origin_country = filter.origin_country.clone();
        self.refresh_options();
        if initial.is_some() {
            self.selected_importers = match filter.importers {
                ImporterSelection::Only(names) => names,
                ImporterSelection::All => self.options.importers.iter().cloned().collect(),
            };
        }
        self.recompute();
    }

    /// Re-derive selector options from the date-filtered relation.
    ///
    /// When the importer options change the selection resets to the default
    /// picks; a country choice no longer offered falls back to "All".
    fn refresh_options(&mut self) {
        let (Some(dataset), Some(range)) = (self.dataset.clone(), self.range) else {
            return;
        };
        let dated = analysis::filter_by_date(&dataset.records, range);
        let options = FilterOptions::from_records(&dated);

        if options.importers != self.options.importers {
            self.selected_importers = match options.default_importers() {
                ImporterSelection::Only(names) => names,
                ImporterSelection::All => options.importers.iter().cloned().collect(),
            };
            self.importer_cursor = 0;
        }
        if !offers(&options.importer_countries, &self.importer_country) {
            self.importer_country = CountryFilter::All;
        }
        if !offers(&options.origin_countries, &self.origin_country) {
            self.origin_country = CountryFilter::All;
        }
        self.options = options;
    }

    /// One dashboard pass with the current settings.
    fn recompute(&mut self) {
        let (Some(dataset), Some(range)) = (self.dataset.clone(), self.range) else {
            self.view = None;
            return;
        };

        let filter = FilterSpec::for_range(range)
            .with_importers(ImporterSelection::Only(self.selected_importers.clone()))
            .with_importer_country(self.importer_country.clone())
            .with_origin_country(self.origin_country.clone());

        let view = build_view(&dataset, &filter, &self.selections);
        self.selections.product = view.product_drilldown.as_ref().map(|d| d.key.clone());
        self.selections.importer = view.importer_drilldown.as_ref().map(|d| d.key.clone());
        self.table_offset = self.table_offset.min(view.records.len().saturating_sub(1));
        self.view = Some(view);
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("shipdash", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {}", self.company())),
        ]));

        let range = self
            .range
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let (rows, total) = match (&self.view, &self.dataset) {
            (Some(v), Some(d)) => (v.records.len(), d.records.len()),
            (None, Some(d)) => (0, d.records.len()),
            _ => (0, 0),
        };
        lines.push(Line::from(Span::styled(
            format!(
                "dates: {range} | rows: {rows}/{total} | importers: {}/{} selected",
                self.selected_importers.len(),
                self.options.importers.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(0)])
            .split(area);

        self.draw_settings(frame, chunks[0]);
        self.draw_content(frame, chunks[1]);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(Field::ALL.len() as u16 + 2), Constraint::Min(0)])
            .split(area);

        let items: Vec<ListItem> = Field::ALL.iter().map(|f| ListItem::new(self.field_label(*f))).collect();
        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, chunks[0], &mut state);

        let importers: Vec<ListItem> = self
            .options
            .importers
            .iter()
            .map(|name| {
                let mark = if self.selected_importers.contains(name) { "[x]" } else { "[ ]" };
                ListItem::new(format!("{mark} {}", truncate(name, 34)))
            })
            .collect();
        let list = List::new(importers)
            .block(
                Block::default()
                    .title("Importers (space toggle, a all, n none)")
                    .borders(Borders::ALL),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default();
        if self.field() == Field::Importers && !self.options.importers.is_empty() {
            state.select(Some(self.importer_cursor));
        }
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn field_label(&self, field: Field) -> String {
        let or_dash = |v: Option<&String>| v.cloned().unwrap_or_else(|| "-".to_string());
        match field {
            Field::Company => format!("Company: {}", self.company()),
            Field::Start | Field::End => {
                let name = if field == Field::Start { "Start" } else { "End" };
                if self.editing == Some(field) {
                    format!("{name}: {}_", self.date_input)
                } else {
                    let day = self
                        .date_of(field)
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    format!("{name}: {day}")
                }
            }
            Field::Importers => format!(
                "Importers: {}/{}",
                self.selected_importers.len(),
                self.options.importers.len()
            ),
            Field::ImporterCountry => format!("Importer country: {}", self.importer_country.label()),
            Field::OriginCountry => format!("Exporter country: {}", self.origin_country.label()),
            Field::Unit => format!("Unit: {}", self.selections.unit),
            Field::Product => format!("Product: {}", truncate(&or_dash(self.selections.product.as_ref()), 30)),
            Field::DrillImporter => format!("Importer: {}", truncate(&or_dash(self.selections.importer.as_ref()), 29)),
        }
    }

    fn draw_content(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .block(Block::default().borders(Borders::ALL))
            .select(self.tab.index())
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, chunks[0]);

        let body = chunks[1];
        frame.render_widget(Clear, body);

        let view = match &self.view {
            Some(view) if !view.is_empty() => view,
            _ => {
                let msg = Paragraph::new("No data")
                    .style(Style::default().fg(Color::Yellow))
                    .block(Block::default().title(self.tab.title()).borders(Borders::ALL));
                frame.render_widget(msg, body);
                return;
            }
        };

        match self.tab {
            Tab::Rankings => {
                let halves = split_even(body, Direction::Horizontal);
                frame.render_widget(
                    ranking_chart("Top Importers by Value".to_string(), &view.top_importers, fmt_amount),
                    halves[0],
                );
                frame.render_widget(
                    ranking_chart("Top Products by Value".to_string(), &view.top_products, fmt_amount),
                    halves[1],
                );
            }
            Tab::Series => {
                let block = Block::default().title("Total Value Over Time").borders(Borders::ALL);
                let inner = block.inner(body);
                frame.render_widget(block, body);
                frame.render_widget(SeriesChart::from_points(&view.monthly, "total value", fmt_axis_value), inner);
            }
            Tab::Countries => self.draw_countries(frame, body, view),
            Tab::Units => {
                let title = format!("Top Products by Quantity ({})", view.unit);
                if view.unit_products.is_empty() {
                    let msg = Paragraph::new(format!("No data available for the selected unit: {}", view.unit))
                        .style(Style::default().fg(Color::Yellow))
                        .block(Block::default().title(title).borders(Borders::ALL));
                    frame.render_widget(msg, body);
                } else {
                    frame.render_widget(ranking_chart(title, &view.unit_products, fmt_quantity), body);
                }
            }
            Tab::Table => self.draw_table(frame, body, view),
            Tab::Trend => {
                let width = body.width.saturating_sub(50).max(10) as usize;
                let mut text = crate::plot::render_bar_chart(&growth_rows(&view.growth), width, fmt_percent);
                if view.trend_excluded_zero_base > 0 {
                    text.push_str(&format!(
                        "\n{} month(s) skipped: previous month total was zero\n",
                        view.trend_excluded_zero_base
                    ));
                }
                let p = Paragraph::new(text).block(
                    Block::default()
                        .title("Top Products by Average Growth Rate")
                        .borders(Borders::ALL),
                );
                frame.render_widget(p, body);
            }
            Tab::Drilldown => {
                let halves = split_even(body, Direction::Horizontal);
                draw_drilldown(frame, halves[0], "Product", "Top Importers", view.product_drilldown.as_ref());
                draw_drilldown(frame, halves[1], "Importer", "Top Products", view.importer_drilldown.as_ref());
            }
        }
    }

    fn draw_countries(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView) {
        let total = view.metrics.total_value;
        let header = Row::new(vec!["Importer country", "Total value", "Share", ""])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = view.countries.iter().map(|r| {
            let share = if total != 0.0 { r.value / total * 100.0 } else { 0.0 };
            // One cell per 4% of the total.
            let bar = "█".repeat((share.max(0.0) / 4.0).round() as usize);
            Row::new(vec![r.key.clone(), fmt_amount(r.value), format!("{share:.1}%"), bar])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Min(20),
                Constraint::Length(20),
                Constraint::Length(8),
                Constraint::Length(26),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .title("Total Value by Importer Country")
                .borders(Borders::ALL),
        );
        frame.render_widget(table, area);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let kpis = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(chunks[0]);
        let kpi = |title: &'static str, value: String| {
            Paragraph::new(value)
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .block(Block::default().title(title).borders(Borders::ALL))
        };
        frame.render_widget(kpi("Total Value", fmt_amount(view.metrics.total_value)), kpis[0]);
        frame.render_widget(kpi("Number of Shipments", view.metrics.shipments.to_string()), kpis[1]);
        frame.render_widget(kpi("Number of Importers", view.metrics.importers.to_string()), kpis[2]);

        let header = Row::new(vec![
            "Date", "Importer", "Imp. country", "Origin", "Product", "Total value", "Qty", "Unit",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));
        let visible = chunks[1].height.saturating_sub(3) as usize;
        let rows = view.records.iter().skip(self.table_offset).take(visible).map(|r| {
            Row::new(vec![
                r.arrival_day().to_string(),
                r.importer_name.clone(),
                r.importer_country.clone(),
                r.origin_country.clone(),
                r.product_details.clone(),
                fmt_amount(r.total_value()),
                r.quantity.map(fmt_quantity).unwrap_or_default(),
                r.quantity_unit.clone(),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Min(16),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Min(16),
                Constraint::Length(14),
                Constraint::Length(8),
                Constraint::Length(6),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .title(format!(
                    "Shipments {}-{} of {} (PgUp/PgDn)",
                    (self.table_offset + 1).min(view.records.len()),
                    (self.table_offset + visible).min(view.records.len()),
                    view.records.len()
                ))
                .borders(Borders::ALL),
        );
        frame.render_widget(table, chunks[1]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit date  Tab switch view  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_drilldown(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    kind: &str,
    ranked: &str,
    drilldown: Option<&Drilldown>,
) {
    let Some(d) = drilldown else {
        let msg = Paragraph::new("No data")
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().title(format!("{kind} Details")).borders(Borders::ALL));
        frame.render_widget(msg, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let scalars = Paragraph::new(vec![
        Line::from(format!("Total Value: {}", fmt_amount(d.total_value))),
        Line::from(format!("Total Quantity: {}", fmt_quantity(d.total_quantity))),
    ])
    .block(
        Block::default()
            .title(format!("{kind}: {}", truncate(&d.key, 40)))
            .borders(Borders::ALL),
    );
    frame.render_widget(scalars, chunks[0]);
    frame.render_widget(ranking_chart(format!("{ranked} by Value"), &d.ranking, fmt_amount), chunks[1]);
}

/// Horizontal bar chart for a ranking. Bars are drawn for non-negative values.
fn ranking_chart<'a>(title: String, rows: &[RankedRow], fmt: fn(f64) -> String) -> BarChart<'a> {
    let bars: Vec<Bar> = rows
        .iter()
        .map(|r| {
            Bar::default()
                .value(r.value.max(0.0).round() as u64)
                .label(Line::from(truncate(&r.key, 24)))
                .text_value(fmt(r.value))
        })
        .collect();

    BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .data(BarGroup::default().bars(&bars))
}

fn split_even(area: Rect, direction: Direction) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

/// Step through `choices`; an unknown or missing current value starts at the first.
fn cycle(choices: &[String], current: Option<&str>, delta: isize) -> Option<String> {
    if choices.is_empty() {
        return None;
    }
    let n = choices.len() as isize;
    let next = match current.and_then(|c| choices.iter().position(|x| x == c)) {
        Some(idx) => (idx as isize + delta).rem_euclid(n) as usize,
        None => 0,
    };
    Some(choices[next].clone())
}

/// Step through `All` followed by `options`.
fn cycle_country(options: &[String], current: &CountryFilter, delta: isize) -> CountryFilter {
    let mut labels = Vec::with_capacity(options.len() + 1);
    labels.push(CountryFilter::ALL_LABEL.to_string());
    labels.extend(options.iter().cloned());
    cycle(&labels, Some(current.label()), delta)
        .map(|label| CountryFilter::from_label(&label))
        .unwrap_or_default()
}

fn offers(options: &[String], current: &CountryFilter) -> bool {
    match current {
        CountryFilter::All => true,
        CountryFilter::Only(name) => options.iter().any(|o| o == name),
    }
}

fn fmt_axis_value(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use ratatui::backend::TestBackend;

    use crate::domain::QuantityUnit;

    const CSV: &str = "\
ARRIVAL DATE,IMPORTER NAME,IMPORTER COUNTRY,COUNTRY OF ORIGIN,PRODUCT DETAILS,IMPORT VALUE CIF,IMPORT VALUE FOB,QUANTITY,QUANTITY UNIT
05/01/2024,Imp0,India,China,Valves,100,,2,PCS
06/01/2024,Imp1,India,China,Valves,100,,2,Pieces
07/01/2024,Imp2,Kenya,Italy,Pipes,100,,2,KGS
08/01/2024,Imp3,India,China,Valves,100,,2,PCS
09/01/2024,Imp4,India,China,Valves,100,,2,PCS
10/01/2024,Imp5,India,China,Valves,100,,2,PCS
10/02/2024,Imp0,India,China,Valves,150,,3,PCS
";

    fn config(dir: &Path, company: &str) -> DashboardConfig {
        DashboardConfig {
            data_dir: dir.to_path_buf(),
            companies: vec!["WOM".to_string(), "Ghost".to_string()],
            company: Some(company.to_string()),
            start: None,
            end: None,
            importers: None,
            all_importers: false,
            importer_country: CountryFilter::All,
            origin_country: CountryFilter::All,
            unit: QuantityUnit::Pcs,
            product: None,
            drill_importer: None,
            bar_width: 40,
            export_csv: None,
            export_json: None,
        }
    }

    fn app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("WOM.csv"), CSV).unwrap();
        let app = App::new(&config(dir.path(), "WOM"));
        (dir, app)
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn select(app: &mut App, field: Field) {
        app.selected_field = Field::ALL.iter().position(|f| *f == field).unwrap();
    }

    #[test]
    fn first_load_uses_bounds_and_default_importers() {
        let (_dir, app) = app();
        assert_eq!(app.range, Some(DateRange::new(day(1, 5), day(2, 10))));
        assert_eq!(app.selected_importers.len(), 5);
        assert!(!app.selected_importers.contains("Imp5"));
        let view = app.view.as_ref().unwrap();
        assert_eq!(view.metrics.shipments, 6);
        assert!(app.status.starts_with("Loaded WOM"));
    }

    #[test]
    fn missing_company_shows_error_and_no_data() {
        let (_dir, mut app) = app();
        select(&mut app, Field::Company);
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.company(), "Ghost");
        assert!(app.view.is_none());
        assert!(app.status.contains("No shipment data for company 'Ghost'"));

        // Switching back hits the cache and restores a view.
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.company(), "WOM");
        assert!(app.view.is_some());
        assert!(app.cache.is_cached("WOM"));
    }

    #[test]
    fn date_edit_is_clamped_to_bounds() {
        let (_dir, mut app) = app();
        select(&mut app, Field::Start);
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.date_input, "2024-01-05");
        for _ in 0..10 {
            app.handle_key(KeyCode::Backspace).unwrap();
        }
        for c in "2020-01-01".chars() {
            app.handle_key(KeyCode::Char(c)).unwrap();
        }
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.range.unwrap().start, day(1, 5));
        assert!(app.status.contains("clamped"));
    }

    #[test]
    fn narrowing_dates_resets_importers_when_options_change() {
        let (_dir, mut app) = app();
        app.selected_importers.clear();
        app.selected_importers.insert("Imp5".to_string());
        select(&mut app, Field::Start);
        app.handle_key(KeyCode::Enter).unwrap();
        app.date_input = "2024-02-01".to_string();
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(app.options.importers, vec!["Imp0"]);
        assert_eq!(app.selected_importers.iter().collect::<Vec<_>>(), vec!["Imp0"]);
        assert_eq!(app.view.as_ref().unwrap().metrics.total_value, 150.0);
    }

    #[test]
    fn invalid_date_keeps_range() {
        let (_dir, mut app) = app();
        select(&mut app, Field::End);
        app.handle_key(KeyCode::Enter).unwrap();
        app.date_input = "2024-13-01".to_string();
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.range.unwrap().end, day(2, 10));
        assert!(app.status.starts_with("Invalid date"));
    }

    #[test]
    fn clearing_importers_degrades_to_no_data() {
        let (_dir, mut app) = app();
        app.handle_key(KeyCode::Char('n')).unwrap();
        let view = app.view.as_ref().unwrap();
        assert!(view.is_empty());
        assert_eq!(view.metrics.shipments, 0);

        app.handle_key(KeyCode::Char('a')).unwrap();
        assert_eq!(app.view.as_ref().unwrap().metrics.shipments, 7);
    }

    #[test]
    fn space_toggles_importer_under_cursor() {
        let (_dir, mut app) = app();
        select(&mut app, Field::Importers);
        app.handle_key(KeyCode::Char(' ')).unwrap();
        assert!(!app.selected_importers.contains("Imp0"));
        app.handle_key(KeyCode::Left).unwrap();
        assert_eq!(app.importer_cursor, 5);
        app.handle_key(KeyCode::Char(' ')).unwrap();
        assert!(app.selected_importers.contains("Imp5"));
    }

    #[test]
    fn country_selector_cycles_through_all_and_options() {
        let (_dir, mut app) = app();
        select(&mut app, Field::ImporterCountry);
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.importer_country, CountryFilter::Only("India".to_string()));
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.importer_country, CountryFilter::Only("Kenya".to_string()));
        assert_eq!(app.view.as_ref().unwrap().metrics.shipments, 1);
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.importer_country, CountryFilter::All);
    }

    #[test]
    fn unit_and_drilldown_selectors() {
        let (_dir, mut app) = app();
        let view = app.view.as_ref().unwrap();
        // `Pieces` counts as PCS.
        assert_eq!(view.unit_products[0].key, "Valves");
        assert_eq!(view.unit_products[0].value, 11.0);

        select(&mut app, Field::Unit);
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.selections.unit, QuantityUnit::Nos);
        assert!(app.view.as_ref().unwrap().unit_products.is_empty());

        select(&mut app, Field::Product);
        assert_eq!(app.selections.product.as_deref(), Some("Valves"));
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.selections.product.as_deref(), Some("Pipes"));
        assert_eq!(app.view.as_ref().unwrap().product_drilldown.as_ref().unwrap().total_value, 100.0);
    }

    #[test]
    fn tabs_wrap_and_quit_keys() {
        let (_dir, mut app) = app();
        app.handle_key(KeyCode::BackTab).unwrap();
        assert_eq!(app.tab, Tab::Drilldown);
        app.handle_key(KeyCode::Tab).unwrap();
        assert_eq!(app.tab, Tab::Rankings);
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn text_tabs_render_without_panicking() {
        let (_dir, mut app) = app();
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        for tab in [Tab::Rankings, Tab::Countries, Tab::Units, Tab::Table, Tab::Trend, Tab::Drilldown] {
            app.tab = tab;
            terminal.draw(|f| app.draw(f)).unwrap();
        }
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Settings"));
        assert!(text.contains("Product: Valves"));
    }

    #[test]
    fn cycle_helpers() {
        let choices = vec!["a".to_string(), "b".to_string()];
        assert_eq!(cycle(&choices, Some("b"), 1).as_deref(), Some("a"));
        assert_eq!(cycle(&choices, Some("a"), -1).as_deref(), Some("b"));
        assert_eq!(cycle(&choices, Some("zz"), 1).as_deref(), Some("a"));
        assert_eq!(cycle(&[], None, 1), None);
        assert_eq!(fmt_axis_value(2_500_000.0), "2.5M");
    }
}
