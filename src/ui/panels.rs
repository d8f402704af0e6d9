use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::Bounds;
use crate::data::format::format_currency;
use crate::data::loader::FileSource;
use crate::data::model::NumericColumn;
use crate::data::normalize::parse_price;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.listings.as_ref().map_or(true, |t| t.is_empty()) {
        ui.label("No data loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            county_filter(ui, state);
            ui.separator();

            range_filter(ui, state, NumericColumn::Price, "Price Range");
            ui.separator();

            range_filter(ui, state, NumericColumn::Acres, "Acres Range");
        });
}

/// Multiselect over the distinct counties. Nothing selected means all.
fn county_filter(ui: &mut Ui, state: &mut AppState) {
    let n_selected = state.selected_counties.len();
    let header = if n_selected == 0 {
        "County  (all)".to_string()
    } else {
        format!("County  ({n_selected}/{})", state.counties.len())
    };

    // Clone so we can mutate state inside the loop.
    let counties = state.counties.clone();

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("county_filter")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                state.clear_counties();
            }
            for county in &counties {
                let mut checked = state.selected_counties.contains(county);
                if ui.checkbox(&mut checked, county.as_str()).changed() {
                    state.toggle_county(county);
                }
            }
        });
}

/// Two sliders bounded by the column's loaded extent.
fn range_filter(ui: &mut Ui, state: &mut AppState, column: NumericColumn, title: &str) {
    ui.strong(title);

    let (extent, current) = match column {
        NumericColumn::Price => (state.price_extent, state.price_range),
        NumericColumn::Acres => (state.acres_extent, state.acres_range),
    };
    let Some(extent) = extent else {
        ui.label(RichText::new("No data").color(Color32::GRAY));
        return;
    };
    let Bounds { min: mut lo, max: mut hi } = current.unwrap_or(extent);

    let mut changed = false;
    for (value, label) in [(&mut lo, "from"), (&mut hi, "to")] {
        let mut slider = egui::Slider::new(value, extent.min..=extent.max).text(label);
        if column == NumericColumn::Price {
            slider = slider
                .custom_formatter(|v, _| format_currency(v))
                .custom_parser(parse_price);
        }
        changed |= ui.add(slider).changed();
    }

    if changed {
        state.set_range(column, lo, hi);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open local CSV…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if ui.button("🔄 Refresh Data").clicked() {
            log::info!("Refresh requested");
            state.refresh();
        }

        ui.separator();

        if let Some(source) = state.source_description() {
            ui.label(RichText::new(source).color(Color32::GRAY));
        }

        if let (Some(table), Some(display)) = (&state.listings, &state.display) {
            ui.separator();
            ui.label(format!(
                "{} listings loaded, {} visible",
                table.len(),
                display.len()
            ));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings CSV")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Switching source to {}", path.display());
        state.set_source(Box::new(FileSource::new(path)));
    }
}
