//! Canonical names of assumptions, line items and scalars
//!
//! Segment-scoped names are built from the segment key, e.g. `a.revenue_growth`
//! (assumption) and `segment.a.ebit` (line item).

// ---- Assumptions: per segment ----

pub const SEG_REVENUE_ANCHOR: &str = "revenue";
pub const SEG_REVENUE_GROWTH: &str = "revenue_growth";
pub const SEG_COGS_PCT: &str = "cogs_pct";
pub const SEG_OPEX_PCT: &str = "opex_pct";
pub const SEG_DA_PCT: &str = "da_pct";

/// Assumption name for a segment driver, e.g. `a.cogs_pct`
pub fn segment_assumption(segment: &str, driver: &str) -> String {
    format!("{}.{}", segment, driver)
}

// ---- Assumptions: company level ----

pub const TAX_RATE: &str = "tax_rate";
pub const INTEREST_RATE: &str = "interest_rate";
pub const PAYOUT_RATIO: &str = "payout_ratio";
pub const DSO: &str = "dso";
pub const DIO: &str = "dio";
pub const DPO: &str = "dpo";
pub const CAPEX: &str = "capex";
pub const DEBT_ISSUANCE: &str = "debt_issuance";
pub const DEBT_REPAYMENT: &str = "debt_repayment";
pub const WACC: &str = "wacc";
pub const TERMINAL_GROWTH: &str = "terminal_growth";
pub const SHARES_OUTSTANDING: &str = "shares_outstanding";

// Reported balances, historical anchors only
pub const CASH: &str = "cash";
pub const ACCOUNTS_RECEIVABLE: &str = "accounts_receivable";
pub const INVENTORY: &str = "inventory";
pub const PPE: &str = "ppe";
pub const ACCOUNTS_PAYABLE: &str = "accounts_payable";
pub const DEBT: &str = "debt";
pub const EQUITY: &str = "equity";

/// Company-level drivers that need a value for every forecast year
pub const COMPANY_DRIVERS: [&str; 12] = [
    TAX_RATE,
    INTEREST_RATE,
    PAYOUT_RATIO,
    DSO,
    DIO,
    DPO,
    CAPEX,
    DEBT_ISSUANCE,
    DEBT_REPAYMENT,
    WACC,
    TERMINAL_GROWTH,
    SHARES_OUTSTANDING,
];

/// Segment drivers that need a value for every forecast year
pub const SEGMENT_DRIVERS: [&str; 4] = [SEG_REVENUE_GROWTH, SEG_COGS_PCT, SEG_OPEX_PCT, SEG_DA_PCT];

/// Balances that must be reported for the last historical year
pub const OPENING_BALANCES: [&str; 7] = [
    CASH,
    ACCOUNTS_RECEIVABLE,
    INVENTORY,
    PPE,
    ACCOUNTS_PAYABLE,
    DEBT,
    EQUITY,
];

// ---- Line items: segments ----

/// Line item name for a segment series, e.g. `segment.a.ebit`
pub fn segment_item(segment: &str, item: &str) -> String {
    format!("segment.{}.{}", segment, item)
}

pub const REVENUE: &str = "revenue";
pub const COGS: &str = "cogs";
pub const GROSS_PROFIT: &str = "gross_profit";
pub const OPEX: &str = "opex";
pub const EBITDA: &str = "ebitda";
pub const DA: &str = "da";
pub const EBIT: &str = "ebit";

// ---- Line items: consolidated P&L ----

pub const PL_REVENUE: &str = "pl.revenue";
pub const PL_COGS: &str = "pl.cogs";
pub const PL_GROSS_PROFIT: &str = "pl.gross_profit";
pub const PL_OPEX: &str = "pl.opex";
pub const PL_EBITDA: &str = "pl.ebitda";
pub const PL_DA: &str = "pl.da";
pub const PL_EBIT: &str = "pl.ebit";
pub const PL_INTEREST: &str = "pl.interest_expense";
pub const PL_PRETAX: &str = "pl.pretax_income";
pub const PL_TAX: &str = "pl.tax";
pub const PL_NET_INCOME: &str = "pl.net_income";
pub const PL_DIVIDENDS: &str = "pl.dividends";
pub const SCHEDULE_DEBT_OPENING: &str = "schedule.debt_opening";
pub const SCHEDULE_DEBT_CLOSING: &str = "schedule.debt_closing";

// ---- Line items: balance sheet ----

pub const BS_CASH: &str = "bs.cash";
pub const BS_RECEIVABLES: &str = "bs.accounts_receivable";
pub const BS_INVENTORY: &str = "bs.inventory";
pub const BS_PPE: &str = "bs.ppe";
pub const BS_TOTAL_ASSETS: &str = "bs.total_assets";
pub const BS_PAYABLES: &str = "bs.accounts_payable";
pub const BS_DEBT: &str = "bs.debt";
pub const BS_TOTAL_LIABILITIES: &str = "bs.total_liabilities";
pub const BS_EQUITY: &str = "bs.equity";
pub const BS_LIABILITIES_AND_EQUITY: &str = "bs.total_liabilities_and_equity";
pub const BS_NET_WORKING_CAPITAL: &str = "bs.net_working_capital";

// ---- Line items: cash flow ----

pub const CF_NET_INCOME: &str = "cf.net_income";
pub const CF_DA: &str = "cf.da";
pub const CF_CHANGE_NWC: &str = "cf.change_in_nwc";
pub const CF_OPERATING: &str = "cf.operating";
pub const CF_CAPEX: &str = "cf.capex";
pub const CF_INVESTING: &str = "cf.investing";
pub const CF_NET_DEBT: &str = "cf.net_borrowing";
pub const CF_DIVIDENDS: &str = "cf.dividends";
pub const CF_FINANCING: &str = "cf.financing";
pub const CF_NET_CHANGE: &str = "cf.net_change_in_cash";
pub const CF_ENDING_CASH: &str = "cf.ending_cash";
pub const CF_UNLEVERED_FCF: &str = "cf.unlevered_fcf";

// ---- DCF ----

pub const DCF_FCF: &str = "dcf.unlevered_fcf";
pub const DCF_DISCOUNT_FACTOR: &str = "dcf.discount_factor";
pub const DCF_PV_FCF: &str = "dcf.pv_fcf";

pub const DCF_SUM_PV_FCF: &str = "dcf.sum_pv_fcf";
pub const DCF_TERMINAL_VALUE: &str = "dcf.terminal_value";
pub const DCF_PV_TERMINAL_VALUE: &str = "dcf.pv_terminal_value";
pub const DCF_ENTERPRISE_VALUE: &str = "dcf.enterprise_value";
pub const DCF_NET_DEBT: &str = "dcf.net_debt";
pub const DCF_EQUITY_VALUE: &str = "dcf.equity_value";
pub const DCF_SHARES: &str = "dcf.shares_outstanding";
pub const DCF_VALUE_PER_SHARE: &str = "dcf.value_per_share";
pub const DCF_WACC: &str = "dcf.wacc";
pub const DCF_TERMINAL_GROWTH: &str = "dcf.terminal_growth";

// ---- Ratios ----

pub const RATIO_REVENUE_GROWTH: &str = "ratio.revenue_growth";
pub const RATIO_GROSS_MARGIN: &str = "ratio.gross_margin";
pub const RATIO_EBITDA_MARGIN: &str = "ratio.ebitda_margin";
pub const RATIO_EBIT_MARGIN: &str = "ratio.ebit_margin";
pub const RATIO_NET_MARGIN: &str = "ratio.net_margin";
pub const RATIO_EFFECTIVE_TAX: &str = "ratio.effective_tax_rate";
pub const RATIO_EPS: &str = "ratio.eps";
pub const RATIO_NET_DEBT: &str = "ratio.net_debt";
pub const RATIO_NET_DEBT_TO_EBITDA: &str = "ratio.net_debt_to_ebitda";
pub const RATIO_INTEREST_COVERAGE: &str = "ratio.interest_coverage";
pub const RATIO_ROE: &str = "ratio.return_on_equity";
pub const RATIO_FCF_CONVERSION: &str = "ratio.fcf_conversion";
pub const RATIO_IMPLIED_EV_EBITDA: &str = "ratio.implied_ev_to_ebitda";

/// Per-segment ratio name, e.g. `ratio.segment.a.ebit_margin`
pub fn segment_ratio(segment: &str, ratio: &str) -> String {
    format!("ratio.segment.{}.{}", segment, ratio)
}

pub const REVENUE_GROWTH: &str = "revenue_growth";
pub const EBIT_MARGIN: &str = "ebit_margin";
pub const REVENUE_MIX: &str = "revenue_mix";
