use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use crate::data::loader::Source;
use crate::data::model::Variation;
use crate::state::{AppState, Tab};
use crate::ui::plot;

const DESCRIPTION: &str = "Este dashboard analisa o desempenho e o volume de atendimentos via \
WhatsApp, expurgando registros de \"Atendimento\" e \"ativo\" para focar em categorias e \
assuntos mais relevantes.";

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Arquivo", |ui: &mut Ui| {
            if ui.button("Abrir…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Recarregar fonte").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.selectable_value(&mut state.tab, Tab::Main, "Principal");
        ui.selectable_value(&mut state.tab, Tab::Wiki, "Wiki");
        ui.separator();

        if let (Some(ds), Some(source)) = (&state.dataset, &state.source) {
            ui.label(format!("{} registros · {source}", ds.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Main tab
// ---------------------------------------------------------------------------

/// Title, filters, metrics and both charts.
pub fn main_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading(RichText::new("Atendimento CSF - WhatsApp").size(26.0).strong());
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.label(DESCRIPTION);
    });
    ui.add_space(8.0);

    if state.dataset.is_none() {
        ui.label("Nenhum conjunto de dados carregado (Arquivo → Abrir… ou Recarregar fonte).");
        return;
    }

    filter_row(ui, state);
    ui.add_space(8.0);

    let Some(view) = &state.view else {
        return;
    };
    if !view.has_data() {
        ui.label("Nenhum atendimento encontrado para a operação e o período selecionados.");
        return;
    }

    if let Some(metrics) = view.metrics {
        let variation = metrics.variation_pct;
        ui.columns(3, |cols: &mut [Ui]| {
            metric_card(
                &mut cols[0],
                "Porcentagem de Variação",
                &variation.to_string(),
                variation_color(variation),
            );
            metric_card(
                &mut cols[1],
                "Menor Volume de Atendimentos",
                &metrics.min_volume.to_string(),
                None,
            );
            metric_card(
                &mut cols[2],
                "Maior Volume de Atendimentos",
                &metrics.max_volume.to_string(),
                None,
            );
        });
        ui.add_space(8.0);
    }

    if let Some(area) = &view.area {
        plot::chart_plot(ui, "area_chart", area);
    }
    ui.add_space(12.0);
    if let Some(comparison) = &view.comparison {
        plot::chart_plot(ui, "comparison_chart", comparison);
    }
}

/// Operation selector and the two date pickers, side by side.
fn filter_row(ui: &mut Ui, state: &mut AppState) {
    let (Some(ds), Some(criteria)) = (&state.dataset, &state.criteria) else {
        return;
    };

    // Copy what we need so we can mutate state inside the columns.
    let categories = ds.categories.clone();
    let mut category = criteria.category.clone();
    let mut start = criteria.start_date;
    let mut end = criteria.end_date;

    let mut category_changed = false;
    let mut start_changed = false;
    let mut end_changed = false;

    ui.columns(3, |cols: &mut [Ui]| {
        cols[0].label("Selecione a operação que deseja analisar:");
        egui::ComboBox::from_id_salt("operation")
            .selected_text(&category)
            .width(cols[0].available_width())
            .show_ui(&mut cols[0], |ui: &mut Ui| {
                for c in &categories {
                    if ui.selectable_value(&mut category, c.clone(), c).changed() {
                        category_changed = true;
                    }
                }
            });

        cols[1].label("Selecione a Data Inicial:");
        start_changed = cols[1]
            .add(DatePickerButton::new(&mut start).id_salt("start_date").format("%d/%m/%Y"))
            .changed();

        cols[2].label("Selecione a Data Final:");
        end_changed = cols[2]
            .add(DatePickerButton::new(&mut end).id_salt("end_date").format("%d/%m/%Y"))
            .changed();
    });

    if category_changed {
        state.set_category(category);
    }
    if start_changed {
        state.set_start_date(start);
    }
    if end_changed {
        state.set_end_date(end);
    }
}

/// Growth in green, decline in red; `n/d` and zero keep the theme colour.
fn variation_color(variation: Variation) -> Option<Color32> {
    match variation.as_percent() {
        Some(p) if p > 0.0 => Some(Color32::from_rgb(0, 140, 60)),
        Some(p) if p < 0.0 => Some(Color32::from_rgb(200, 40, 40)),
        _ => None,
    }
}

fn metric_card(ui: &mut Ui, label: &str, value: &str, color: Option<Color32>) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.label(label);
        let mut text = RichText::new(value).size(28.0).strong();
        if let Some(color) = color {
            text = text.color(color);
        }
        ui.label(text);
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Abrir registro de atendimentos")
        .add_filter("Arquivos suportados", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load(Source::File(path));
    }
}
