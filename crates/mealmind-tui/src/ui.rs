use mealmind_core::screen::{
    HomeData, InventoryData, MealListData, RecipeDetail, ScreenData, Urgency, ZeroWasteData,
};
use mealmind_core::{ScreenId, Status};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FormField, InputMode};

const PLACEHOLDER_COLORS: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

/// Stable tint for a recipe that has no picture yet.
pub fn placeholder_color(name: &str) -> Color {
    let mut hash: i32 = 0;
    for unit in name.encode_utf16() {
        hash = (unit as i32).wrapping_add((hash << 5).wrapping_sub(hash));
    }
    PLACEHOLDER_COLORS[(hash.unsigned_abs() as usize) % PLACEHOLDER_COLORS.len()]
}

fn ellipsis(frame: u8) -> &'static str {
    match frame {
        0 => ".",
        1 => "..",
        _ => "...",
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.session.status() {
        Status::Idle => render_form(app, frame, body_area),
        Status::Loading => render_loading(app, frame, body_area),
        Status::Error => render_error(app, frame, body_area),
        Status::Success => render_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if app.show_api_key_input {
        render_api_key_input(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let prefs = app.session.preferences().current();

    let mut spans = vec![Span::styled(
        " MealMind ",
        Style::default().fg(Color::Green).bold(),
    )];
    if prefs.baby_mode() {
        spans.push(Span::styled(" Baby Mode ", Style::default().bg(Color::Magenta).fg(Color::White)));
        spans.push(Span::raw(" "));
    }
    if prefs.pet_mode() {
        spans.push(Span::styled(" Pet Mode ", Style::default().bg(Color::Blue).fg(Color::White)));
        spans.push(Span::raw(" "));
    }
    if let Some(screen) = app.session.current_screen() {
        spans.push(Span::styled(
            format!(" {} ", screen.display_name()),
            Style::default().fg(Color::White),
        ));
    }
    spans.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(notice) = &app.notice {
        let line = Paragraph::new(format!(" {} ", notice))
            .style(Style::default().bg(Color::Black).fg(Color::Green));
        frame.render_widget(line, area);
        return;
    }

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    match (app.session.status(), app.input_mode) {
        (Status::Idle, InputMode::Editing) => {
            if app.form_field == FormField::Inventory {
                hints.extend(hint("Enter", "analyze"));
            } else {
                hints.extend(hint("Enter", "done"));
            }
            hints.extend(hint("Tab", "next"));
            hints.extend(hint("Esc", "stop editing"));
        }
        (Status::Idle, InputMode::Normal) => {
            hints.extend(hint("j/k", "field"));
            if app.form_field.options().is_empty() {
                hints.extend(hint("Space", "change"));
            } else {
                hints.extend(hint("h/l", "option"));
                hints.extend(hint("Space", "toggle"));
            }
            hints.extend(hint("i", "edit"));
            hints.extend(hint("s", "analyze"));
            hints.extend(hint("K", "api key"));
            hints.extend(hint("q", "quit"));
        }
        (Status::Success, _) => {
            match app.session.current_screen() {
                Some(ScreenId::Home) => {
                    hints.extend(hint("1", "expiring"));
                    hints.extend(hint("2", "pantry"));
                    hints.extend(hint("3", "recipes"));
                }
                Some(ScreenId::MealList) => {
                    hints.extend(hint("j/k", "nav"));
                    hints.extend(hint("Enter", "open"));
                }
                Some(ScreenId::RecipeDetail) => {
                    hints.extend(hint("g", "view dish"));
                    if app.session.view().generated_image().is_some() {
                        hints.extend(hint("w", "save image"));
                    }
                    hints.extend(hint("b", "back"));
                }
                Some(ScreenId::Inventory) => hints.extend(hint("j/k", "nav")),
                _ => hints.extend(hint("j/k", "scroll")),
            }
            hints.extend(nav_hints(&hint));
        }
        (Status::Loading, _) | (Status::Error, _) => hints.extend(nav_hints(&hint)),
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn nav_hints<'a>(hint: &impl Fn(&'static str, &'static str) -> [Span<'a>; 2]) -> Vec<Span<'a>> {
    [
        hint("h", "home"),
        hint("i", "inventory"),
        hint("m", "meals"),
        hint("z", "zero waste"),
        hint("r", "start over"),
        hint("q", "quit"),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn render_form(app: &App, frame: &mut Frame, area: Rect) {
    let [intro_area, input_area, prefs_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let intro = Paragraph::new(vec![
        Line::from(Span::styled(
            " What's in your kitchen?",
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from(Span::styled(
            " List what you have, e.g. \"3 eggs, half a bag of spinach, leftover rice\".",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(intro, intro_area);

    // Inventory input
    let editing_inventory =
        app.input_mode == InputMode::Editing && app.form_field == FormField::Inventory;
    let border_color = if editing_inventory {
        Color::Yellow
    } else if app.form_field == FormField::Inventory {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Inventory ");
    let inner_width = input_area.width.saturating_sub(2);

    // Keep the cursor on screen by scrolling long input sideways
    let h_scroll = (app.input_cursor as u16).saturating_sub(inner_width.saturating_sub(1));
    let input = Paragraph::new(app.session.input().to_string())
        .block(block)
        .scroll((0, h_scroll));
    frame.render_widget(input, input_area);

    if editing_inventory {
        let cursor_x = (app.input_cursor as u16).saturating_sub(h_scroll);
        frame.set_cursor_position((input_area.x + 1 + cursor_x, input_area.y + 1));
    }

    // Preference rows
    let prefs = app.session.preferences().current();
    let mut lines: Vec<Line> = Vec::new();
    for field in app.visible_fields() {
        if field == FormField::Inventory {
            continue;
        }
        let focused = field == app.form_field;
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };

        let mut spans = vec![
            Span::styled(marker, Style::default().fg(Color::Cyan)),
            Span::styled(format!("{:<12}", field.label()), label_style),
        ];

        match field {
            FormField::FoodType => spans.push(Span::raw(prefs.food_type().as_str())),
            FormField::SpiceLevel => spans.push(Span::raw(prefs.spice_level().as_str())),
            FormField::BabyMode => spans.push(toggle_span(prefs.baby_mode())),
            FormField::PetMode => spans.push(toggle_span(prefs.pet_mode())),
            FormField::BabyAge | FormField::PetDetails => {
                let text = app.detail_text(field);
                let editing = focused && app.input_mode == InputMode::Editing;
                if text.is_empty() && !editing {
                    let hint = if field == FormField::BabyAge {
                        "e.g. 8 months"
                    } else {
                        "e.g. Senior Dog"
                    };
                    spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
                } else {
                    spans.push(Span::styled(text, Style::default().fg(Color::Yellow)));
                    if editing {
                        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
                    }
                }
            }
            FormField::DietGoals | FormField::Cuisines | FormField::Allergens => {
                let selected = match field {
                    FormField::DietGoals => prefs.diet_goals(),
                    FormField::Cuisines => prefs.preferred_cuisines(),
                    _ => prefs.allergens(),
                };
                let on_color = if field == FormField::Allergens {
                    Color::Red
                } else {
                    Color::Green
                };
                for (i, option) in field.options().iter().enumerate() {
                    let mut style = if selected.contains(*option) {
                        Style::default().bg(on_color).fg(Color::Black)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    if focused && i == app.chip_cursor {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    spans.push(Span::styled(format!(" {} ", option), style));
                    spans.push(Span::raw(" "));
                }
            }
            FormField::Submit => {
                spans.clear();
                spans.push(Span::raw("  "));
                let style = if focused {
                    Style::default().bg(Color::Green).fg(Color::Black).bold()
                } else {
                    Style::default().fg(Color::Green)
                };
                spans.push(Span::styled(" Analyze my kitchen ", style));
            }
            FormField::Inventory => {}
        }

        lines.push(Line::from(spans));
        lines.push(Line::default());
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Preferences ");
    let prefs_widget = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(prefs_widget, prefs_area);
}

fn toggle_span(enabled: bool) -> Span<'static> {
    if enabled {
        Span::styled("[x] on", Style::default().fg(Color::Green))
    } else {
        Span::styled("[ ] off", Style::default().fg(Color::DarkGray))
    }
}

fn render_loading(app: &App, frame: &mut Frame, area: Rect) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let text = Text::from(vec![
        Line::from(Span::styled(
            format!("Consulting the kitchen{}", ellipsis(app.animation_frame)),
            Style::default().fg(Color::Green).bold(),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Reading your inventory and preferences",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), middle);
}

fn render_error(app: &App, frame: &mut Frame, area: Rect) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 7.min(area.height);
    let popup_area = Rect::new(
        area.x + (area.width.saturating_sub(popup_width)) / 2,
        area.y + (area.height.saturating_sub(popup_height)) / 2,
        popup_width,
        popup_height,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Something went wrong ");

    let message = app.session.view().error_message().unwrap_or_default();
    let text = Text::from(vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red))),
        Line::default(),
        Line::from(Span::styled(
            "Pick a screen to try again, or press r to start over.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

fn render_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(response) = app.session.view().current_data().cloned() else {
        return;
    };

    match response.data() {
        ScreenData::Home(home) => render_home(home, frame, area),
        ScreenData::Inventory(inventory) => render_inventory(app, inventory, frame, area),
        ScreenData::MealList(list) => render_meal_list(app, list, frame, area),
        ScreenData::RecipeDetail(detail) => render_recipe(app, detail, frame, area),
        ScreenData::ZeroWaste(zero_waste) => render_zero_waste(app, zero_waste, frame, area),
    }
}

fn render_home(home: &HomeData, frame: &mut Frame, area: Rect) {
    let [greeting_area, tiles_area, tip_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Min(0),
    ])
    .areas(area);

    let greeting = Paragraph::new(vec![
        Line::from(Span::styled(
            home.greeting.clone(),
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from(home.welcome_overview.clone()),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::NONE));
    frame.render_widget(greeting, greeting_area);

    let counts = home.summary_counts;
    let tiles = [
        ("1", "Expiring", counts.items_expiring, Color::Red),
        ("2", "Pantry", counts.total_items, Color::Cyan),
        ("3", "Recipes", counts.possible_meals, Color::Green),
    ];
    let tile_areas = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(tiles_area);
    for ((key, label, count, color), tile_area) in tiles.into_iter().zip(tile_areas.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(format!(" {} ", key));
        let tile = Paragraph::new(vec![
            Line::from(Span::styled(count.to_string(), Style::default().fg(color).bold())),
            Line::from(Span::styled(label, Style::default().fg(Color::Gray))),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(tile, *tile_area);
    }

    let tip = Paragraph::new(home.daily_tip.clone())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Daily tip "),
        );
    frame.render_widget(tip, tip_area);
}

fn urgency_color(urgency: Urgency) -> Color {
    match urgency {
        Urgency::Urgent => Color::Red,
        Urgency::Soon => Color::Yellow,
        Urgency::Safe => Color::Green,
    }
}

fn days_label(days_remaining: i64) -> String {
    match days_remaining {
        d if d <= 0 => "expired".to_string(),
        1 => "1 day".to_string(),
        d => format!("{} days", d),
    }
}

fn render_inventory(app: &mut App, inventory: &InventoryData, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Freshness Tracker ");

    let items = inventory.sorted_by_freshness();
    if items.is_empty() {
        let empty = Paragraph::new("No items found.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let urgency = item.urgency();
            let color = urgency_color(urgency);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!(" {:<6} ", urgency.label()), Style::default().fg(Color::Black).bg(color)),
                    Span::raw(" "),
                    Span::styled(item.name.clone(), Style::default().bold()),
                    Span::styled(format!("  {}", item.category.as_str()), Style::default().fg(Color::DarkGray)),
                    Span::styled(format!("  {}", days_label(item.days_remaining)), Style::default().fg(color)),
                    Span::styled(format!("  {}", item.quantity_estimate), Style::default().fg(Color::Gray)),
                ]),
                Line::from(Span::styled(
                    format!("         {}", item.storage_advice),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(list_items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::Black))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_meal_list(app: &mut App, list: &MealListData, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Suggested Meals ");

    if list.recipes.is_empty() {
        let empty = Paragraph::new("No meals could be suggested from this inventory.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = list
        .recipes
        .iter()
        .map(|card| {
            let (badge, badge_color) = if card.is_vegetarian() {
                ("Veg", Color::Green)
            } else {
                ("Non-Veg", Color::Red)
            };
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(card.recipe_name.clone(), Style::default().bold()),
                    Span::raw("  "),
                    Span::styled(format!(" {} ", badge), Style::default().bg(badge_color).fg(Color::Black)),
                    Span::styled(format!("  {}", card.diet_category), Style::default().fg(Color::Cyan)),
                    Span::styled(format!("  {}", card.estimated_calories), Style::default().fg(Color::Gray)),
                ]),
                Line::from(Span::styled(
                    format!("  Uses: {}", card.ingredients_used.join(", ")),
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            if let Some(warning) = card.allergen_warning.as_deref().filter(|w| !w.is_empty()) {
                lines.push(Line::from(Span::styled(
                    format!("  ! {}", warning),
                    Style::default().fg(Color::Red),
                )));
            }
            lines.push(Line::default());
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Black))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_recipe(app: &App, detail: &RecipeDetail, frame: &mut Frame, area: Rect) {
    let [image_area, body_area] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Min(0),
    ])
    .areas(area);

    // Picture panel
    let view = app.session.view();
    let (image_text, image_color) = if let Some(image) = view.generated_image() {
        (
            format!(
                "Dish image ready ({} KB). Press w to save it.",
                image.byte_len().div_ceil(1024)
            ),
            Color::Green,
        )
    } else if view.image_in_progress() {
        (
            format!("Generating{}", ellipsis(app.animation_frame)),
            Color::Yellow,
        )
    } else {
        (
            "No picture yet. Press g to view the dish.".to_string(),
            placeholder_color(&detail.recipe_name),
        )
    };
    let initial = detail
        .recipe_name
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();
    let image = Paragraph::new(vec![
        Line::from(Span::styled(initial, Style::default().fg(image_color).bold())),
        Line::from(Span::styled(image_text, Style::default().fg(image_color))),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(image_color)),
    );
    frame.render_widget(image, image_area);

    // Details
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            detail.recipe_name.clone(),
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from(Span::styled(
            format!(
                "Serves {}  |  {}  |  {}",
                detail.servings, detail.preparation_time, detail.calorie_estimate
            ),
            Style::default().fg(Color::Gray),
        )),
    ];

    let mut badges: Vec<Span> = Vec::new();
    if detail.is_baby_safe {
        badges.push(Span::styled(" Baby Safe ", Style::default().bg(Color::Magenta).fg(Color::White)));
        badges.push(Span::raw(" "));
    }
    if detail.is_pet_safe {
        badges.push(Span::styled(" Pet Safe ", Style::default().bg(Color::Blue).fg(Color::White)));
        badges.push(Span::raw(" "));
    }
    for suitability in &detail.diet_suitability {
        badges.push(Span::styled(format!(" {} ", suitability), Style::default().bg(Color::DarkGray).fg(Color::White)));
        badges.push(Span::raw(" "));
    }
    if !badges.is_empty() {
        lines.push(Line::from(badges));
    }
    if let Some(warning) = detail.allergen_warning.as_deref().filter(|w| !w.is_empty()) {
        lines.push(Line::from(Span::styled(
            format!("! {}", warning),
            Style::default().fg(Color::Red).bold(),
        )));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Ingredients", Style::default().fg(Color::Cyan).bold())));
    for ingredient in &detail.ingredients {
        lines.push(Line::from(vec![
            Span::raw("  - "),
            Span::styled(ingredient.measurement.clone(), Style::default().fg(Color::Yellow)),
            Span::raw(" "),
            Span::raw(ingredient.item.clone()),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Steps", Style::default().fg(Color::Cyan).bold())));
    for (i, step) in detail.steps.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}. ", i + 1), Style::default().fg(Color::Green)),
            Span::raw(step.clone()),
        ]));
    }

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.content_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Recipe "),
        );
    frame.render_widget(body, body_area);
}

fn render_zero_waste(app: &App, zero_waste: &ZeroWasteData, frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    let sections = [
        ("Transform leftovers", &zero_waste.transformations, Color::Green),
        ("Storage tips", &zero_waste.storage_tips, Color::Cyan),
    ];
    for (title, tips, color) in sections {
        lines.push(Line::from(Span::styled(title, Style::default().fg(color).bold())));
        if tips.is_empty() {
            lines.push(Line::from(Span::styled("  Nothing to suggest.", Style::default().fg(Color::DarkGray))));
        }
        for tip in tips.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}: ", tip.item), Style::default().bold()),
                Span::raw(tip.tip.clone()),
            ]));
        }
        lines.push(Line::default());
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.content_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(" Zero Waste "),
        );
    frame.render_widget(paragraph, area);
}

/// Masks a key for display, keeping the last four characters visible, and maps
/// `cursor` (a char index into `input`) to a column in the masked text.
/// At most 20 stars are drawn, so a cursor deep inside a long key rests at the
/// `...` marker.
fn masked_key(input: &str, cursor: usize) -> (String, usize) {
    const MAX_STARS: usize = 20;
    const MARKER: &str = "...";

    let char_count = input.chars().count();
    let cursor = cursor.min(char_count);
    if char_count <= 4 {
        return ("*".repeat(char_count), cursor);
    }

    let masked_len = char_count - 4;
    let stars = masked_len.min(MAX_STARS);
    let last_four: String = input.chars().skip(masked_len).collect();
    let text = format!("{}{}{}", "*".repeat(stars), MARKER, last_four);

    let column = if cursor < masked_len {
        cursor.min(stars)
    } else {
        stars + MARKER.len() + (cursor - masked_len)
    };
    (text, column)
}

fn render_api_key_input(app: &App, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 7;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Enter Gemini API Key ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let instructions = Paragraph::new("Paste your API key below. Press Enter to save, Esc to cancel.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);

    let (display_text, cursor_col) = masked_key(&app.api_key_input, app.api_key_input_cursor);
    frame.render_widget(
        Paragraph::new(display_text).style(Style::default().fg(Color::Cyan)),
        input_area,
    );

    let cursor_x = cursor_col.min(input_area.width as usize) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));

    let char_count = app.api_key_input.chars().count();
    let status = Paragraph::new(format!("{} characters", char_count))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, Rect::new(inner.x, inner.y + 4, inner.width, 1));
}
