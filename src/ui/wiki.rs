use eframe::egui::{RichText, Ui};

/// Filters applied when the call log was extracted.
const EXTRACTION_FILTERS: [(&str, &str); 8] = [
    ("Unidade", "Igual a \"CSF\"."),
    (
        "Papel do criador",
        "Igual a \"Assistente CSF\", \"Assistente CSF CM\", \"Assistente CSF Ajuda Quality\".",
    ),
    ("Origem do caso", "Igual a \"WhatsApp\"."),
    ("Categoria", "Diferente de \"Atendimento\"."),
    ("Assunto", "Não contém \"Atendimento\"."),
    ("Assunto", "Não contém \"Ativo\"."),
    ("Categorização", "Não contém \"Ativo\"."),
    ("Motivo", "Não contém \"Ativo\"."),
];

const INDICATORS: [(&str, &str); 3] = [
    (
        "Porcentagem de Variação",
        "Variação entre o primeiro e o último mês do período selecionado. \
         Aparece como \"n/d\" quando o primeiro mês não tem atendimentos.",
    ),
    (
        "Menor Volume de Atendimentos",
        "Menor volume mensal registrado no período selecionado.",
    ),
    (
        "Maior Volume de Atendimentos",
        "Maior volume mensal registrado no período selecionado.",
    ),
];

pub fn wiki_tab(ui: &mut Ui) {
    ui.heading(RichText::new("Wiki").size(26.0).strong());
    ui.add_space(8.0);

    ui.strong("Os filtros utilizados para extrair a base de dados foram os seguintes:");
    for (field, rule) in EXTRACTION_FILTERS {
        bullet(ui, field, rule);
    }
    ui.add_space(12.0);

    ui.strong("Indicadores:");
    for (name, text) in INDICATORS {
        bullet(ui, name, text);
    }
    ui.add_space(12.0);

    ui.label(
        "Meses sem nenhum atendimento não aparecem nos gráficos: a série salta direto \
         para o próximo mês com registros.",
    );
}

fn bullet(ui: &mut Ui, title: &str, text: &str) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label("•");
        ui.label(RichText::new(format!("{title}:")).strong());
        ui.label(text);
    });
}
