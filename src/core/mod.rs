mod engine;
mod types;

pub use engine::{
    aggregate, calculate_investment_return, calculate_properties, calculate_property,
    summarize_investments,
};
pub use types::{
    CalculatedProperty, Entry, EntryId, ExtraExpense, HumanCapitalIncome, InterestMode,
    Investment, InvestmentReturn, InvestmentTotals, Property, Results, Snapshot,
};
