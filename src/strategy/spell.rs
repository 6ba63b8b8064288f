use crate::config::SelectorConfig;
use crate::model::SpellRecord;
use crate::strategy::text::{
    all_texts, collapse_whitespace, element_text, first_text, parse_level, strip_non_ascii,
};
use crate::strategy::{compile, ParsingStrategy};
use crate::StrategyError;
use scraper::{Html, Selector};

/// Compiled selectors for every field of a spell detail page
#[derive(Debug, Clone)]
pub struct SpellSelectors {
    name: Selector,
    level: Selector,
    school: Selector,
    tags: Selector,
    classes: Selector,
    casting_time: Selector,
    duration: Selector,
    range: Selector,
    components: Selector,
    material: Selector,
    target: Selector,
    ritual: Selector,
    source: Selector,
    saving_throw: Selector,
    texts: Vec<Selector>,
}

impl SpellSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, StrategyError> {
        Ok(Self {
            name: compile("name", &config.name)?,
            level: compile("level", &config.level)?,
            school: compile("school", &config.school)?,
            tags: compile("tags", &config.tags)?,
            classes: compile("classes", &config.classes)?,
            casting_time: compile("casting-time", &config.casting_time)?,
            duration: compile("duration", &config.duration)?,
            range: compile("range", &config.range)?,
            components: compile("components", &config.components)?,
            material: compile("material", &config.material)?,
            target: compile("target", &config.target)?,
            ritual: compile("ritual", &config.ritual)?,
            source: compile("source", &config.source)?,
            saving_throw: compile("saving-throw", &config.saving_throw)?,
            texts: config
                .texts
                .iter()
                .map(|selector| compile("texts", selector))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Extracts a `SpellRecord` from a detail page
///
/// Every field is read independently; a selector that matches nothing leaves
/// that field at its zero value.
#[derive(Debug, Clone)]
pub struct SpellStrategy {
    selectors: SpellSelectors,
}

impl SpellStrategy {
    pub fn new(config: &SelectorConfig) -> Result<Self, StrategyError> {
        Ok(Self {
            selectors: SpellSelectors::compile(config)?,
        })
    }

    fn level(&self, document: &Html) -> i32 {
        document
            .select(&self.selectors.level)
            .next()
            .map(|element| parse_level(&element_text(element)))
            .unwrap_or(SpellRecord::LEVEL_NOT_FOUND)
    }

    /// Component badges first, then the material description if present
    fn components(&self, document: &Html) -> Vec<String> {
        let mut components = all_texts(document, &self.selectors.components);
        if let Some(material) = document.select(&self.selectors.material).next() {
            components.push(element_text(material));
        }
        components
    }

    fn texts(&self, document: &Html) -> Vec<String> {
        self.selectors
            .texts
            .iter()
            .flat_map(|selector| document.select(selector))
            .map(|element| collapse_whitespace(&element.text().collect::<String>()))
            .collect()
    }

    fn source(&self, document: &Html) -> String {
        strip_non_ascii(&first_text(document, &self.selectors.source))
    }
}

impl ParsingStrategy for SpellStrategy {
    type Output = SpellRecord;

    fn name(&self) -> &'static str {
        "spell"
    }

    fn parse(&self, document: &Html) -> SpellRecord {
        let s = &self.selectors;

        SpellRecord {
            name: first_text(document, &s.name),
            level: self.level(document),
            school: first_text(document, &s.school),
            tags: all_texts(document, &s.tags),
            casting_time: first_text(document, &s.casting_time),
            range: first_text(document, &s.range),
            target: first_text(document, &s.target),
            saving_throw: first_text(document, &s.saving_throw),
            components: self.components(document),
            duration: first_text(document, &s.duration),
            ritual: document.select(&s.ritual).next().is_some(),
            classes: all_texts(document, &s.classes),
            texts: self.texts(document),
            source: self.source(document),
        }
    }
}
