use serde::{Deserialize, Serialize};

pub type EntryId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    #[serde(default)]
    pub id: EntryId,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Entry<T> {
    pub fn new(id: impl Into<EntryId>, data: T) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum InterestMode {
    #[default]
    #[serde(rename = "nominal", alias = "simple")]
    Simple,
    #[serde(rename = "composto", alias = "compound")]
    Compound,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Property {
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    #[serde(rename = "valor", alias = "purchaseValue")]
    pub purchase_value: f64,
    #[serde(rename = "valorVenda", alias = "saleValue")]
    pub sale_value: f64,
    #[serde(rename = "renda", alias = "monthlyRent")]
    pub monthly_rent: f64,
    #[serde(rename = "irPercent", alias = "taxPercent")]
    pub tax_percent: f64,
    /// Annual municipal property tax (IMI).
    #[serde(rename = "imi", alias = "annualPropertyTax")]
    pub annual_property_tax: f64,
    #[serde(rename = "condominio", alias = "monthlyCondoFee")]
    pub monthly_condo_fee: f64,
    #[serde(rename = "seguro", alias = "monthlyInsurance")]
    pub monthly_insurance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraExpense {
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    #[serde(rename = "valorMensal", alias = "monthlyAmount")]
    pub monthly_amount: f64,
    #[serde(rename = "valorAnual", alias = "annualAmount")]
    pub annual_amount: f64,
}

impl ExtraExpense {
    pub fn from_monthly(name: impl Into<String>, monthly_amount: f64) -> Self {
        Self {
            name: name.into(),
            monthly_amount,
            annual_amount: monthly_amount * 12.0,
        }
    }

    pub fn from_annual(name: impl Into<String>, annual_amount: f64) -> Self {
        Self {
            name: name.into(),
            monthly_amount: annual_amount / 12.0,
            annual_amount,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Investment {
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    #[serde(rename = "valor", alias = "principal")]
    pub principal: f64,
    #[serde(rename = "rendimentoBruto", alias = "grossAnnualRatePercent")]
    pub gross_annual_rate_percent: f64,
    #[serde(rename = "impostoPercent", alias = "taxPercent")]
    pub tax_percent: f64,
    #[serde(rename = "tipoJuros", alias = "interestMode")]
    pub interest_mode: InterestMode,
    // Only read in compound mode; 0 or missing means simple interest.
    #[serde(
        rename = "diasCapitalizacao",
        alias = "compoundingPeriodDays",
        skip_serializing_if = "Option::is_none"
    )]
    pub compounding_period_days: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanCapitalIncome {
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    #[serde(rename = "rendimentoLiquido", alias = "netMonthlyIncome")]
    pub net_monthly_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedProperty {
    pub id: EntryId,
    #[serde(flatten)]
    pub property: Property,
    pub tax_amount: f64,
    pub monthly_property_tax: f64,
    pub monthly_expenses: f64,
    pub net_income: f64,
    pub net_income_after_expenses: f64,
    pub annual_rent: f64,
    pub annual_tax: f64,
    pub annual_expenses: f64,
    pub annual_net_income: f64,
    pub annual_net_income_after_expenses: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentReturn {
    pub gross_annual: f64,
    pub tax_annual: f64,
    pub net_annual: f64,
    pub net_monthly: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentTotals {
    pub principal: f64,
    pub gross_annual: f64,
    pub net_annual: f64,
    pub net_monthly: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    pub human_capital_monthly: f64,
    pub human_capital_annual: f64,
    pub total_rent_monthly: f64,
    pub total_tax_monthly: f64,
    pub total_expenses_monthly: f64,
    pub total_net_monthly: f64,
    pub net_after_expenses_monthly: f64,
    pub total_rent_annual: f64,
    pub total_tax_annual: f64,
    pub total_expenses_annual: f64,
    pub total_net_annual: f64,
    pub net_after_expenses_annual: f64,
    pub extra_expenses_monthly: f64,
    pub extra_expenses_annual: f64,
    pub final_property_income_monthly: f64,
    pub final_property_income_annual: f64,
    pub investments_monthly: f64,
    pub investments_annual: f64,
    pub property_plus_investments_monthly: f64,
    pub property_plus_investments_annual: f64,
    pub total_income_monthly: f64,
    pub total_income_annual: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "capitalHumano", alias = "humanCapital", default)]
    pub human_capital: Vec<Entry<HumanCapitalIncome>>,
    #[serde(rename = "imoveis", alias = "properties")]
    pub properties: Vec<Entry<Property>>,
    #[serde(rename = "despesasExtras", alias = "extraExpenses")]
    pub extra_expenses: Vec<Entry<ExtraExpense>>,
    #[serde(rename = "investimentos", alias = "investments")]
    pub investments: Vec<Entry<Investment>>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.human_capital.is_empty()
            && self.properties.is_empty()
            && self.extra_expenses.is_empty()
            && self.investments.is_empty()
    }

    pub fn results(&self) -> Results {
        super::engine::aggregate(
            &self.human_capital,
            &self.properties,
            &self.extra_expenses,
            &self.investments,
        )
    }
}
