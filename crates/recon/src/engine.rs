use std::collections::HashMap;

use crate::aggregate::summarize_sectors;
use crate::audit::{build_audit, MatchTally};
use crate::brand::{Brand, PerBrand};
use crate::error::ReconError;
use crate::mapping::{ColumnMapping, DatasetKind};
use crate::model::{
    AccountAnalysis, ActiveAccount, AuditData, BrandDataset, Classification, CycleSelector,
    MatchedBy, RawRow, ReconResult,
};
use crate::purchases::{extract_brand_purchases, BrandPurchases};
use crate::roster::{extract_active_roster, ActiveRoster};

/// Dataset name used in errors about the master mapping.
pub const MASTER_DATASET: &str = "geral";

/// Everything one run needs, pre-loaded by the caller.
#[derive(Debug, Clone)]
pub struct ReconInput {
    pub master_rows: Vec<RawRow>,
    pub master_mapping: ColumnMapping,
    pub brands: HashMap<Brand, BrandDataset>,
}

/// Reconcile a pre-loaded input for one cycle selection.
pub fn run(input: &ReconInput, selector: &CycleSelector) -> Result<ReconResult, ReconError> {
    reconcile(&input.master_rows, &input.master_mapping, &input.brands, selector)
}

/// Classify every active master account by the brands it bought from.
///
/// Returns `Err` only for a master mapping missing a required field. An
/// empty roster for the selected cycle is an `Ok` result with
/// `success = false`. Problems with one brand dataset are reported in
/// `errors` and that brand counts as having no sales.
pub fn reconcile(
    master_rows: &[RawRow],
    master_mapping: &ColumnMapping,
    brands: &HashMap<Brand, BrandDataset>,
    selector: &CycleSelector,
) -> Result<ReconResult, ReconError> {
    master_mapping.validate(DatasetKind::Master, MASTER_DATASET)?;

    let roster = extract_active_roster(master_rows, master_mapping, selector);
    if roster.is_empty() {
        return Ok(ReconResult {
            resellers: Vec::new(),
            sector_summaries: Vec::new(),
            audit: AuditData::empty(selector, roster.skipped_without_identity),
            success: false,
            errors: vec![format!("no active accounts found for cycle {selector}")],
        });
    }

    let mut errors = Vec::new();
    let purchases = collect_purchases(&roster, brands, selector, &mut errors);

    let mut tally = MatchTally::default();
    let resellers: Vec<AccountAnalysis> = roster
        .accounts()
        .iter()
        .map(|account| analyze_account(account, &purchases, &mut tally))
        .collect();

    let sector_summaries = summarize_sectors(&resellers);
    let audit = build_audit(&roster, &resellers, tally, selector);

    Ok(ReconResult {
        resellers,
        sector_summaries,
        audit,
        success: true,
        errors,
    })
}

/// Per-brand sale sets, intersected with the roster's codes and names.
fn collect_purchases(
    roster: &ActiveRoster,
    brands: &HashMap<Brand, BrandDataset>,
    selector: &CycleSelector,
    errors: &mut Vec<String>,
) -> PerBrand<BrandPurchases> {
    let valid_codes = roster.valid_codes();
    let valid_names = roster.valid_names();

    let mut purchases: PerBrand<BrandPurchases> = PerBrand::default();
    for brand in Brand::ALL {
        let Some(dataset) = brands.get(&brand).filter(|d| !d.rows.is_empty()) else {
            continue;
        };

        if let Err(e) = dataset.mapping.validate(DatasetKind::Brand, brand.label()) {
            log::warn!("skipping brand {brand}: {e}");
            errors.push(e.to_string());
            continue;
        }

        if matches!(selector, CycleSelector::Cycle(_)) && dataset.mapping.cycle_column().is_none() {
            log::warn!("brand {brand}: no cycle column mapped, rows not filtered by cycle {selector}");
            errors.push(format!(
                "brand '{brand}': no cycle column mapped; sales from every cycle were counted"
            ));
        }

        let mut found = extract_brand_purchases(&dataset.rows, &dataset.mapping, selector);
        let (raw_codes, raw_names) = (found.by_code.len(), found.by_name.len());
        found.retain_roster(&valid_codes, &valid_names);
        log::debug!(
            "brand {brand}: {raw_codes} codes / {raw_names} names sold, {} / {} in roster",
            found.by_code.len(),
            found.by_name.len()
        );
        purchases[brand] = found;
    }
    purchases
}

/// Match one account against every brand, in brand order.
///
/// Accounts with a code match by code only; accounts without one match by
/// name only. Audit counters move once per account, on its first match.
fn analyze_account(
    account: &ActiveAccount,
    purchases: &PerBrand<BrandPurchases>,
    tally: &mut MatchTally,
) -> AccountAnalysis {
    let strategy = if account.codigo_normalizado.is_empty() {
        MatchedBy::Nome
    } else {
        MatchedBy::Codigo
    };

    let mut brands_purchased = Vec::new();
    let mut matched_by = None;

    for brand in Brand::ALL {
        let sales = &purchases[brand];
        let found = match strategy {
            MatchedBy::Codigo => sales.has_code(&account.codigo_normalizado),
            MatchedBy::Nome => sales.has_name(&account.nome_normalizado),
        };
        if !found {
            continue;
        }

        brands_purchased.push(brand);
        tally.total_por_marca[brand] += 1;
        if matched_by.is_none() {
            matched_by = Some(strategy);
            tally.record_first_match(strategy);
        }
    }

    let brand_count = brands_purchased.len();
    AccountAnalysis {
        codigo_revendedora: account.codigo_revendedora.clone(),
        codigo_normalizado: account.codigo_normalizado.clone(),
        nome_revendedora: account.nome_revendedora.clone(),
        nome_normalizado: account.nome_normalizado.clone(),
        setor: account.setor.clone(),
        brands_purchased,
        brand_count,
        classification: Classification::from_brand_count(brand_count),
        matched_by,
    }
}
