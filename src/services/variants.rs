use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::scoring::{CategoryScorer, MonitorTraits, MouseTraits, ScorerSet};
use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{
        GearCategory, GearId, GearItem, ScoredCandidate, UsageLink, UserPreferences, VariantKind,
        VariantSetup,
    },
};

/// Builds the Performance, Balanced and Pro rigs for a preference record
pub struct VariantComposer {
    catalog: Arc<dyn CatalogStore>,
    scorers: ScorerSet,
    score_ceiling: f64,
}

impl VariantComposer {
    pub fn new(catalog: Arc<dyn CatalogStore>, scorers: ScorerSet, score_ceiling: f64) -> Self {
        Self {
            catalog,
            scorers,
            score_ceiling,
        }
    }

    /// Top candidates of a single category
    pub async fn rank_category(
        &self,
        prefs: &UserPreferences,
        category: GearCategory,
    ) -> AppResult<Vec<ScoredCandidate>> {
        let scorer = self.scorers.get(category).ok_or_else(|| {
            AppError::InvalidInput(format!("{} is not a scored category", category))
        })?;
        let items = self.catalog.gear_in_category(category).await?;
        Ok(scorer.rank(prefs, &items))
    }

    /// The three named rigs, in Performance, Balanced, Pro order
    pub async fn compose(&self, prefs: &UserPreferences) -> AppResult<Vec<VariantSetup>> {
        let mut catalog = HashMap::new();
        let mut usage = Vec::new();

        for category in GearCategory::RIG {
            catalog.insert(category, self.catalog.gear_in_category(category).await?);
            usage.extend(self.catalog.usage_links(category).await?);
        }

        tracing::debug!(
            items = catalog.values().map(Vec::len).sum::<usize>(),
            usage_links = usage.len(),
            "Composing variants"
        );

        Ok(compose_variants(
            prefs,
            &self.scorers,
            &catalog,
            &usage,
            self.score_ceiling,
        ))
    }
}

/// Pro pick with the usage count that selected it (0 for the sentiment fallback)
#[derive(Debug, Clone)]
struct ProPick {
    candidate: ScoredCandidate,
    usage_count: usize,
}

#[derive(Debug, Default)]
struct CategoryPicks {
    ranked: Vec<ScoredCandidate>,
    pro: Option<ProPick>,
}

impl CategoryPicks {
    fn performance(&self) -> Option<&ScoredCandidate> {
        self.ranked.first()
    }

    fn balanced(&self) -> Option<&ScoredCandidate> {
        self.ranked.get(1).or(self.ranked.first())
    }

    fn has_alternative(&self) -> bool {
        self.ranked.len() > 1
    }
}

/// Composes the three rigs from a catalog snapshot
///
/// A category without catalog items becomes an empty slot in every variant.
pub fn compose_variants(
    prefs: &UserPreferences,
    scorers: &ScorerSet,
    catalog: &HashMap<GearCategory, Vec<GearItem>>,
    usage: &[UsageLink],
    score_ceiling: f64,
) -> Vec<VariantSetup> {
    let mut picks: BTreeMap<GearCategory, CategoryPicks> = BTreeMap::new();

    for category in GearCategory::RIG {
        let Some(scorer) = scorers.get(category) else {
            continue;
        };
        let items = catalog.get(&category).map(Vec::as_slice).unwrap_or(&[]);
        let ranked = scorer.rank(prefs, items);
        let pro = pro_pick(category, scorer, prefs, items, &ranked, usage);
        picks.insert(category, CategoryPicks { ranked, pro });
    }

    vec![
        performance_variant(prefs, &picks, score_ceiling),
        balanced_variant(prefs, &picks, score_ceiling),
        pro_variant(prefs, &picks, score_ceiling),
    ]
}

/// Most-used item of the category, or the highest-sentiment candidate without usage data
fn pro_pick(
    category: GearCategory,
    scorer: &dyn CategoryScorer,
    prefs: &UserPreferences,
    items: &[GearItem],
    ranked: &[ScoredCandidate],
    usage: &[UsageLink],
) -> Option<ProPick> {
    let mut counts: HashMap<GearId, usize> = HashMap::new();
    for link in usage {
        *counts.entry(link.gear_id).or_default() += 1;
    }

    let mut leader: Option<(&GearItem, usize)> = None;
    for item in items.iter().filter(|item| item.category == category) {
        let count = counts.get(&item.id).copied().unwrap_or(0);
        if count > 0 && leader.map_or(true, |(_, best)| count > best) {
            leader = Some((item, count));
        }
    }

    if let Some((item, usage_count)) = leader {
        let mut candidate = scorer.score(prefs, item);
        candidate
            .reasons
            .push(format!("Most used {} among Pro Players", category));
        candidate
            .reasons
            .push(format!("Used by {} Pros in our database", usage_count));
        return Some(ProPick {
            candidate,
            usage_count,
        });
    }

    let mut best: Option<&ScoredCandidate> = None;
    for candidate in ranked {
        if best.map_or(true, |b| candidate.sentiment > b.sentiment) {
            best = Some(candidate);
        }
    }

    best.map(|candidate| ProPick {
        candidate: candidate.clone(),
        usage_count: 0,
    })
}

fn context_reason(kind: VariantKind, category: GearCategory, prefs: &UserPreferences) -> String {
    let label = match (kind, category) {
        (VariantKind::Performance, GearCategory::Mouse) => {
            return format!("Top Spec Match for {}", prefs.genre)
        }
        (VariantKind::Performance, GearCategory::Keyboard) => "Max Performance Choice",
        (VariantKind::Performance, GearCategory::Headset) => "Best Audio Precision",
        (VariantKind::Performance, GearCategory::Monitor) => "High Refresh Rate Focus",
        (VariantKind::Performance, GearCategory::Chair) => "Max Ergonomics",
        (VariantKind::Performance, GearCategory::Mousepad) => "Top Surface Match",
        (VariantKind::Balanced, GearCategory::Mouse) => "Best Value Alternative",
        (VariantKind::Balanced, GearCategory::Keyboard) => "Balanced Feature Set",
        (VariantKind::Balanced, GearCategory::Headset) => "Great Audio/Price Ratio",
        (VariantKind::Balanced, GearCategory::Monitor) => "Solid Performance Value",
        (VariantKind::Balanced, GearCategory::Chair) => "Comfortable Value Choice",
        (VariantKind::Balanced, GearCategory::Mousepad) => "Value Surface Pick",
        (VariantKind::Pro, GearCategory::Mouse) => "Pro Usage Leader",
        (VariantKind::Pro, GearCategory::Keyboard) => "Most Popular Model",
        (VariantKind::Pro, GearCategory::Headset) => "Top Sound Choice",
        (VariantKind::Pro, GearCategory::Monitor) => "Standard Issue Monitor",
        (VariantKind::Pro, GearCategory::Chair) => "Most Trusted Seat",
        (VariantKind::Pro, GearCategory::Mousepad) => "Pro Surface Pick",
    };
    label.to_string()
}

/// Sum of pick scores over the ceiling, as a percentage clamped to [0, 100]
pub fn normalized_score<'a>(
    picks: impl IntoIterator<Item = &'a ScoredCandidate>,
    score_ceiling: f64,
) -> f64 {
    if score_ceiling <= 0.0 {
        return 0.0;
    }
    let total: f64 = picks.into_iter().map(|c| c.score).sum();
    (total / score_ceiling * 100.0).clamp(0.0, 100.0)
}

fn finish(
    kind: VariantKind,
    prefs: &UserPreferences,
    chosen: BTreeMap<GearCategory, Option<ScoredCandidate>>,
    narrative: Narrative,
    score_ceiling: f64,
) -> VariantSetup {
    let picks: BTreeMap<GearCategory, Option<ScoredCandidate>> = chosen
        .into_iter()
        .map(|(category, pick)| {
            let pick = pick.map(|mut candidate| {
                candidate.reasons.push(context_reason(kind, category, prefs));
                candidate
            });
            (category, pick)
        })
        .collect();

    let score = normalized_score(picks.values().flatten(), score_ceiling);

    let (badge, description) = match kind {
        VariantKind::Performance => ("Best Match", "Top-tier specs matched to your playstyle."),
        VariantKind::Balanced => ("Value Pick", "Great performance with alternative features."),
        VariantKind::Pro => ("Pro Choice", "Most used by Pros."),
    };

    VariantSetup {
        name: kind,
        badge: badge.to_string(),
        description: description.to_string(),
        analysis: narrative.analysis,
        pros: narrative.pros,
        cons: narrative.cons,
        score,
        picks,
    }
}

struct Narrative {
    analysis: String,
    pros: Vec<String>,
    cons: Vec<String>,
}

fn mouse_weight(candidate: &ScoredCandidate) -> Option<f64> {
    MouseTraits::from_item(&candidate.gear).weight
}

fn monitor_refresh(candidate: &ScoredCandidate) -> Option<f64> {
    MonitorTraits::stated_refresh_hz(&candidate.gear).map(f64::trunc)
}

fn monitor_panel(candidate: &ScoredCandidate) -> String {
    MonitorTraits::from_item(&candidate.gear).panel
}

fn performance_variant(
    prefs: &UserPreferences,
    picks: &BTreeMap<GearCategory, CategoryPicks>,
    score_ceiling: f64,
) -> VariantSetup {
    let chosen = picks
        .iter()
        .map(|(category, p)| (*category, p.performance().cloned()))
        .collect();

    let analysis = format!(
        "This setup is laser-focused on {} performance. Every piece of gear was selected \
         to maximize your competitive edge with your {} hands and {} grip style.",
        prefs.genre, prefs.hand_size, prefs.grip
    );
    let mut pros = vec![format!("Best spec match for {} gameplay", prefs.genre)];
    let mut cons = Vec::new();

    if let Some(mouse) = picks.get(&GearCategory::Mouse).and_then(CategoryPicks::performance) {
        if let Some(weight) = mouse_weight(mouse) {
            pros.push(if weight < 70.0 {
                format!("Ultra-lightweight mouse ({}g) for fast aim", weight)
            } else if weight < 85.0 {
                format!("Well-balanced mouse weight ({}g)", weight)
            } else {
                format!("Stable, heavier mouse ({}g) for precision control", weight)
            });
        }
        let shape = mouse.gear.specs.text("Shape");
        if shape.contains("Ergonomic") {
            pros.push("Ergonomic mouse shape for comfort during long sessions".to_string());
        } else if shape.contains("Ambidextrous") {
            pros.push("Ambidextrous mouse suitable for any hand orientation".to_string());
        }
    }

    if let Some(keyboard) = picks.get(&GearCategory::Keyboard).and_then(CategoryPicks::performance) {
        let form = keyboard.gear.specs.text("Form Factor");
        if form.contains("60%") || form.contains("65%") {
            pros.push(format!("Compact {} keyboard maximizes desk space", form));
        } else if form.contains("TKL") {
            pros.push("TKL layout balances function keys and mouse space".to_string());
        } else if form.contains("Full") {
            pros.push("Full-size keyboard with numpad and macro keys".to_string());
        }
    }

    if let Some(monitor) = picks.get(&GearCategory::Monitor).and_then(CategoryPicks::performance) {
        if let Some(hz) = monitor_refresh(monitor) {
            pros.push(format!("{}Hz refresh rate for silky-smooth visuals", hz));
        }
        let panel = monitor_panel(monitor);
        if panel.contains("TN") {
            cons.push("TN panel with limited viewing angles and color accuracy".to_string());
        } else if panel.contains("IPS") {
            pros.push("IPS panel with good color accuracy".to_string());
        }
    }

    pros.push("High compatibility score based on your profile".to_string());
    cons.push("Premium gear may be harder to find in some regions".to_string());
    if !pros.iter().any(|p| p.to_lowercase().contains("comfort")) {
        cons.push("Spec-focused, so comfort and ergonomics may be secondary".to_string());
    }

    finish(
        VariantKind::Performance,
        prefs,
        chosen,
        Narrative {
            analysis,
            pros,
            cons,
        },
        score_ceiling,
    )
}

fn balanced_variant(
    prefs: &UserPreferences,
    picks: &BTreeMap<GearCategory, CategoryPicks>,
    score_ceiling: f64,
) -> VariantSetup {
    let chosen = picks
        .iter()
        .map(|(category, p)| (*category, p.balanced().cloned()))
        .collect();

    let analysis = format!(
        "A smart alternative for {} players. This setup offers excellent performance from \
         different brands or product lines, giving you variety and potentially better availability.",
        prefs.genre
    );
    let mut pros = vec!["Great overall performance with alternative options".to_string()];

    if let Some(mice) = picks.get(&GearCategory::Mouse).filter(|p| p.has_alternative()) {
        let top = &mice.ranked[0];
        let alternative = &mice.ranked[1];
        if top.gear.brand != alternative.gear.brand {
            pros.push(format!(
                "Different mouse brand ({}) for a fresh perspective",
                alternative.gear.brand
            ));
        }
        if let Some(weight) = mouse_weight(alternative).filter(|w| *w < 80.0) {
            pros.push(format!("Lightweight mouse option ({}g)", weight));
        }
    }

    if let Some(keyboards) = picks.get(&GearCategory::Keyboard).filter(|p| p.has_alternative()) {
        if let Some(form) = keyboards.ranked[1].gear.specs.get("Form Factor") {
            pros.push(format!("Alternative keyboard layout: {}", form));
        }
    }

    if let Some(monitors) = picks.get(&GearCategory::Monitor).filter(|p| p.has_alternative()) {
        let alternative = &monitors.ranked[1];
        if let Some(hz) = monitor_refresh(alternative) {
            pros.push(format!("Monitor with {}Hz refresh rate", hz));
        }
        let panel = monitor_panel(alternative);
        if panel.contains("IPS") || panel.contains("VA") {
            pros.push(format!("Better color reproduction with {} panel", panel));
        }
    }

    let cons = vec![
        "Slightly lower spec-match score than the Performance preset".to_string(),
        "May not be as fine-tuned to your specific hand size and grip".to_string(),
    ];

    finish(
        VariantKind::Balanced,
        prefs,
        chosen,
        Narrative {
            analysis,
            pros,
            cons,
        },
        score_ceiling,
    )
}

fn pro_variant(
    prefs: &UserPreferences,
    picks: &BTreeMap<GearCategory, CategoryPicks>,
    score_ceiling: f64,
) -> VariantSetup {
    let chosen = picks
        .iter()
        .map(|(category, p)| (*category, p.pro.as_ref().map(|pick| pick.candidate.clone())))
        .collect();

    let analysis = "The meta setup: these are the products most used by professional players. \
                    This selection represents the current meta, prioritizing what the experts \
                    are actually using over theoretical spec matching."
        .to_string();
    let mut pros = vec![
        "Most popular choices among professional players".to_string(),
        "Battle-tested in competitive environments".to_string(),
    ];
    let mut cons = Vec::new();

    if let Some(mice) = picks.get(&GearCategory::Mouse) {
        if let Some(pro_mouse) = &mice.pro {
            if pro_mouse.usage_count > 2 {
                pros.push(format!(
                    "Mouse is a dominant choice with {} pro users",
                    pro_mouse.usage_count
                ));
            }
            let agrees = mice
                .performance()
                .map_or(false, |top| top.gear.id == pro_mouse.candidate.gear.id);
            if agrees {
                pros.push("Aligns with the Performance spec-match too".to_string());
            } else {
                cons.push("May not be the best spec-match for your specific hand size and grip".to_string());
            }
        }
    }

    cons.push("Popularity drives demand, so stock might be an issue".to_string());
    cons.push("The meta changes over time".to_string());

    finish(
        VariantKind::Pro,
        prefs,
        chosen,
        Narrative {
            analysis,
            pros,
            cons,
        },
        score_ceiling,
    )
}
