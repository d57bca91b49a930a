//! Mode-independent structure of a will: every word both renderers print.

use serde::Serialize;

use crate::workflows::testament::domain::WillDocument;
use crate::workflows::testament::format::{clause_ordinal, long_date, roman, short_date};

pub const TITLE: &str = "TESTAMENTO ABIERTO";
pub const SIGNATURE_CAPTION: &str = "Firma del Testador";
pub const DISCLAIMER_LABEL: &str = "IMPORTANTE:";
pub const DISCLAIMER: &str = "Este documento es un borrador de testamento generado por MiLegado. \
Para que tenga validez legal, debe ser otorgado ante notario público conforme al artículo 1011 y \
siguientes del Código Civil de Chile. Se recomienda consultar con un abogado especialista antes de \
su formalización.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Identification,
    Revocation,
    Assets,
    Beneficiaries,
    SpecialInstructions,
    GeneralDispositions,
}

impl SectionKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Identification => "IDENTIFICACIÓN DEL TESTADOR",
            Self::Revocation => "REVOCACIÓN DE TESTAMENTOS ANTERIORES",
            Self::Assets => "DECLARACIÓN DE BIENES",
            Self::Beneficiaries => "DESIGNACIÓN DE HEREDEROS Y LEGATARIOS",
            Self::SpecialInstructions => "INSTRUCCIONES ESPECIALES",
            Self::GeneralDispositions => "DISPOSICIONES GENERALES",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Paragraph { text: String },
    Clause { ordinal: String, text: String },
    ListItem { text: String },
}

impl Block {
    /// Bold clause label, e.g. `PRIMERO:`.
    pub fn clause_label(ordinal: &str) -> String {
        format!("{ordinal}:")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub number: u32,
    pub blocks: Vec<Block>,
}

impl Section {
    /// `III. DECLARACIÓN DE BIENES`
    pub fn heading(&self) -> String {
        format!("{}. {}", roman(self.number), self.kind.title())
    }

    pub fn list_items(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::ListItem { text } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn clause_ordinals(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Clause { ordinal, .. } => Some(ordinal.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub title: String,
    pub granted_by: String,
    pub national_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureBlock {
    pub closing: String,
    pub name: String,
    pub national_id: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disclaimer {
    pub label: String,
    pub text: String,
    pub stamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedWill {
    pub header: Header,
    pub sections: Vec<Section>,
    pub signature: SignatureBlock,
    pub disclaimer: Disclaimer,
}

impl ComposedWill {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    /// Every printed string in reading order. Both output modes emit exactly
    /// this sequence.
    pub fn text_sequence(&self) -> Vec<String> {
        let mut texts = vec![
            self.header.title.clone(),
            self.header.granted_by.clone(),
            self.header.national_id.clone(),
        ];

        for section in &self.sections {
            texts.push(section.heading());
            for block in &section.blocks {
                match block {
                    Block::Paragraph { text } | Block::ListItem { text } => {
                        texts.push(text.clone())
                    }
                    Block::Clause { ordinal, text } => {
                        texts.push(Block::clause_label(ordinal));
                        texts.push(text.clone());
                    }
                }
            }
        }

        texts.extend([
            self.signature.closing.clone(),
            self.signature.name.clone(),
            self.signature.national_id.clone(),
            self.signature.caption.clone(),
            self.disclaimer.label.clone(),
            self.disclaimer.text.clone(),
            self.disclaimer.stamp.clone(),
        ]);
        texts
    }
}

/// Section and clause counters. Optional sections consume numbers only when
/// present, so everything after them shifts together.
#[derive(Debug, Default)]
struct Numbering {
    section: u32,
    clause: u32,
}

impl Numbering {
    fn section(&mut self) -> u32 {
        self.section += 1;
        self.section
    }

    fn clause(&mut self, text: impl Into<String>) -> Block {
        self.clause += 1;
        Block::Clause {
            ordinal: clause_ordinal(self.clause),
            text: text.into(),
        }
    }
}

/// Non-blank lines of a free-text block, trimmed, in order.
pub fn list_entries(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

fn list_items(text: &str) -> impl Iterator<Item = Block> + '_ {
    list_entries(text).map(|line| Block::ListItem {
        text: line.to_string(),
    })
}

pub fn compose(document: &WillDocument) -> ComposedWill {
    let testator = &document.testator;
    let full_name = testator.full_name();
    let today = long_date(document.generated_on);
    let rut_line = format!("RUT: {}", testator.national_id);

    let mut numbering = Numbering::default();
    let mut sections = Vec::with_capacity(6);

    sections.push(Section {
        kind: SectionKind::Identification,
        number: numbering.section(),
        blocks: vec![Block::Paragraph {
            text: format!(
                "En {city}, a {today}, comparece don(ña) {full_name}, cédula nacional de identidad \
                 número {rut}, de estado civil {status}, nacido(a) el {birth}, con domicilio en \
                 {address}, {city}, quien declara encontrarse en pleno uso de sus facultades \
                 mentales y actuar libre de coacción, otorgando el presente testamento conforme a \
                 las disposiciones del Código Civil de Chile.",
                city = testator.city,
                rut = testator.national_id,
                status = testator.marital_status,
                birth = short_date(testator.birth_date),
                address = testator.address,
            ),
        }],
    });

    sections.push(Section {
        kind: SectionKind::Revocation,
        number: numbering.section(),
        blocks: vec![numbering.clause(
            "Por el presente acto, revoco expresamente cualquier testamento, codicilo o \
             disposición testamentaria que hubiere otorgado con anterioridad a la fecha del \
             presente instrumento, dejando sin efecto toda disposición anterior incompatible con \
             lo aquí establecido.",
        )],
    });

    let mut assets = vec![numbering.clause(
        "Declaro que al momento de otorgar este testamento, mi patrimonio se compone, entre \
         otros, de los siguientes bienes:",
    )];
    assets.extend(list_items(&document.assets));
    sections.push(Section {
        kind: SectionKind::Assets,
        number: numbering.section(),
        blocks: assets,
    });

    let mut beneficiaries = vec![numbering.clause(
        "Es mi voluntad que mis bienes sean distribuidos de la siguiente manera, respetando las \
         legítimas que correspondan según la ley:",
    )];
    beneficiaries.extend(list_items(&document.beneficiaries));
    sections.push(Section {
        kind: SectionKind::Beneficiaries,
        number: numbering.section(),
        blocks: beneficiaries,
    });

    if let Some(instructions) = document.special_instructions() {
        let mut blocks = vec![numbering.clause(
            "Además de lo anteriormente dispuesto, es mi voluntad expresar las siguientes \
             instrucciones especiales:",
        )];
        blocks.extend(list_items(instructions));
        sections.push(Section {
            kind: SectionKind::SpecialInstructions,
            number: numbering.section(),
            blocks,
        });
    }

    sections.push(Section {
        kind: SectionKind::GeneralDispositions,
        number: numbering.section(),
        blocks: vec![
            numbering.clause(
                "Declaro que este testamento refleja fielmente mi voluntad y ha sido otorgado en \
                 pleno uso de mis facultades mentales, sin presión ni coacción de ninguna \
                 naturaleza.",
            ),
            numbering.clause(format!(
                "Para todos los efectos legales derivados de este testamento, fijo mi domicilio \
                 en {}, {}, Chile.",
                testator.address, testator.city
            )),
        ],
    });

    ComposedWill {
        header: Header {
            title: TITLE.to_string(),
            granted_by: format!("Otorgado por {full_name}"),
            national_id: rut_line.clone(),
        },
        sections,
        signature: SignatureBlock {
            closing: format!("Así lo otorgo y firmo en {}, a {today}.", testator.city),
            name: full_name,
            national_id: rut_line,
            caption: SIGNATURE_CAPTION.to_string(),
        },
        disclaimer: Disclaimer {
            label: DISCLAIMER_LABEL.to_string(),
            text: DISCLAIMER.to_string(),
            stamp: format!("Documento generado el {today} mediante www.milegado.cl"),
        },
    }
}
