use super::types::{
    CalculatedProperty, Entry, ExtraExpense, HumanCapitalIncome, InterestMode, Investment,
    InvestmentReturn, InvestmentTotals, Property, Results,
};

const MONTHS_PER_YEAR: f64 = 12.0;
const DAYS_PER_YEAR: f64 = 365.0;

pub fn calculate_property(entry: &Entry<Property>) -> CalculatedProperty {
    let p = &entry.data;
    let tax_amount = p.monthly_rent * (p.tax_percent / 100.0);
    let monthly_property_tax = p.annual_property_tax / MONTHS_PER_YEAR;
    let monthly_expenses = p.monthly_condo_fee + p.monthly_insurance + monthly_property_tax;
    let net_income = p.monthly_rent - tax_amount;
    let net_income_after_expenses = net_income - monthly_expenses;

    CalculatedProperty {
        id: entry.id.clone(),
        property: p.clone(),
        tax_amount,
        monthly_property_tax,
        monthly_expenses,
        net_income,
        net_income_after_expenses,
        annual_rent: p.monthly_rent * MONTHS_PER_YEAR,
        annual_tax: tax_amount * MONTHS_PER_YEAR,
        annual_expenses: monthly_expenses * MONTHS_PER_YEAR,
        annual_net_income: net_income * MONTHS_PER_YEAR,
        annual_net_income_after_expenses: net_income_after_expenses * MONTHS_PER_YEAR,
    }
}

pub fn calculate_properties(properties: &[Entry<Property>]) -> Vec<CalculatedProperty> {
    properties.iter().map(calculate_property).collect()
}

pub fn calculate_investment_return(inv: &Investment) -> InvestmentReturn {
    let rate = inv.gross_annual_rate_percent / 100.0;
    let gross_annual = match (inv.interest_mode, inv.compounding_period_days) {
        (InterestMode::Compound, Some(days)) if days > 0 => {
            let periods_per_year = DAYS_PER_YEAR / f64::from(days);
            let final_amount = inv.principal * (1.0 + rate / periods_per_year).powf(periods_per_year);
            final_amount - inv.principal
        }
        _ => inv.principal * rate,
    };
    let tax_annual = gross_annual * (inv.tax_percent / 100.0);
    let net_annual = gross_annual - tax_annual;

    InvestmentReturn {
        gross_annual,
        tax_annual,
        net_annual,
        net_monthly: net_annual / MONTHS_PER_YEAR,
    }
}

pub fn summarize_investments(investments: &[Entry<Investment>]) -> InvestmentTotals {
    investments
        .iter()
        .fold(InvestmentTotals::default(), |mut totals, entry| {
            let ret = calculate_investment_return(&entry.data);
            totals.principal += entry.data.principal;
            totals.gross_annual += ret.gross_annual;
            totals.net_annual += ret.net_annual;
            totals.net_monthly += ret.net_monthly;
            totals
        })
}

pub fn aggregate(
    human_capital: &[Entry<HumanCapitalIncome>],
    properties: &[Entry<Property>],
    extra_expenses: &[Entry<ExtraExpense>],
    investments: &[Entry<Investment>],
) -> Results {
    let human_capital_monthly: f64 = human_capital
        .iter()
        .map(|h| h.data.net_monthly_income)
        .sum();

    let mut total_rent_monthly = 0.0;
    let mut total_tax_monthly = 0.0;
    let mut total_expenses_monthly = 0.0;
    let mut total_net_monthly = 0.0;
    for entry in properties {
        let calc = calculate_property(entry);
        total_rent_monthly += entry.data.monthly_rent;
        total_tax_monthly += calc.tax_amount;
        total_expenses_monthly += calc.monthly_expenses;
        total_net_monthly += calc.net_income;
    }
    let net_after_expenses_monthly = total_net_monthly - total_expenses_monthly;

    let extra_expenses_monthly: f64 = extra_expenses.iter().map(|e| e.data.monthly_amount).sum();
    let extra_expenses_annual: f64 = extra_expenses.iter().map(|e| e.data.annual_amount).sum();

    let final_property_income_monthly = net_after_expenses_monthly - extra_expenses_monthly;
    let final_property_income_annual = final_property_income_monthly * MONTHS_PER_YEAR;

    let totals = summarize_investments(investments);
    let investments_monthly = totals.net_monthly;
    let investments_annual = totals.net_annual;

    let human_capital_annual = human_capital_monthly * MONTHS_PER_YEAR;

    Results {
        human_capital_monthly,
        human_capital_annual,
        total_rent_monthly,
        total_tax_monthly,
        total_expenses_monthly,
        total_net_monthly,
        net_after_expenses_monthly,
        total_rent_annual: total_rent_monthly * MONTHS_PER_YEAR,
        total_tax_annual: total_tax_monthly * MONTHS_PER_YEAR,
        total_expenses_annual: total_expenses_monthly * MONTHS_PER_YEAR,
        total_net_annual: total_net_monthly * MONTHS_PER_YEAR,
        net_after_expenses_annual: net_after_expenses_monthly * MONTHS_PER_YEAR,
        extra_expenses_monthly,
        extra_expenses_annual,
        final_property_income_monthly,
        final_property_income_annual,
        investments_monthly,
        investments_annual,
        property_plus_investments_monthly: final_property_income_monthly + investments_monthly,
        property_plus_investments_annual: final_property_income_annual + investments_annual,
        total_income_monthly: human_capital_monthly
            + final_property_income_monthly
            + investments_monthly,
        total_income_annual: human_capital_annual
            + final_property_income_annual
            + investments_annual,
    }
}
