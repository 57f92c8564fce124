mod cache;
mod gateway;
mod session;

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::{
    Entry, EntryId, ExtraExpense, HumanCapitalIncome, InterestMode, Investment, Property,
    Results, Snapshot,
};
use crate::errors::{Error, Result};

pub use cache::{EntryCache, JsonFileCache, MemoryCache};
pub use gateway::{FileStore, Gateway, sanitize_username};
pub use session::{Notice, NoticeLevel, Session};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EntryKind {
    HumanCapital,
    Property,
    ExtraExpense,
    Investment,
}

impl EntryKind {
    pub const ALL: [EntryKind; 4] = [
        EntryKind::HumanCapital,
        EntryKind::Property,
        EntryKind::ExtraExpense,
        EntryKind::Investment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::HumanCapital => "capitalHumano",
            EntryKind::Property => "imoveis",
            EntryKind::ExtraExpense => "despesasExtras",
            EntryKind::Investment => "investimentos",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Scope {
    #[default]
    Anonymous,
    User(String),
}

impl Scope {
    pub fn user(username: &str) -> Result<Self> {
        let name = sanitize_username(username);
        if name.is_empty() {
            return Err(Error::validation("username is required"));
        }
        Ok(Scope::User(name))
    }

    pub fn key(&self) -> String {
        match self {
            Scope::Anonymous => "anonymous".to_string(),
            Scope::User(name) => format!("user_{name}"),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Scope::Anonymous => None,
            Scope::User(name) => Some(name.as_str()),
        }
    }
}

pub trait Record: Clone + Sized {
    const KIND: EntryKind;
    type Patch;

    fn apply(&mut self, patch: Self::Patch);

    fn list(entries: &Snapshot) -> &Vec<Entry<Self>>;
    fn list_mut(entries: &mut Snapshot) -> &mut Vec<Entry<Self>>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPatch {
    pub name: Option<String>,
    pub purchase_value: Option<f64>,
    pub sale_value: Option<f64>,
    pub monthly_rent: Option<f64>,
    pub tax_percent: Option<f64>,
    pub annual_property_tax: Option<f64>,
    pub monthly_condo_fee: Option<f64>,
    pub monthly_insurance: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraExpensePatch {
    pub name: Option<String>,
    pub monthly_amount: Option<f64>,
    pub annual_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvestmentPatch {
    pub name: Option<String>,
    pub principal: Option<f64>,
    pub gross_annual_rate_percent: Option<f64>,
    pub tax_percent: Option<f64>,
    pub interest_mode: Option<InterestMode>,
    /// `Some(None)` clears the period.
    pub compounding_period_days: Option<Option<u32>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HumanCapitalPatch {
    pub name: Option<String>,
    pub net_monthly_income: Option<f64>,
}

fn merge<T>(field: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *field = v;
    }
}

impl Record for Property {
    const KIND: EntryKind = EntryKind::Property;
    type Patch = PropertyPatch;

    fn apply(&mut self, patch: PropertyPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.purchase_value, patch.purchase_value);
        merge(&mut self.sale_value, patch.sale_value);
        merge(&mut self.monthly_rent, patch.monthly_rent);
        merge(&mut self.tax_percent, patch.tax_percent);
        merge(&mut self.annual_property_tax, patch.annual_property_tax);
        merge(&mut self.monthly_condo_fee, patch.monthly_condo_fee);
        merge(&mut self.monthly_insurance, patch.monthly_insurance);
    }

    fn list(entries: &Snapshot) -> &Vec<Entry<Self>> {
        &entries.properties
    }

    fn list_mut(entries: &mut Snapshot) -> &mut Vec<Entry<Self>> {
        &mut entries.properties
    }
}

impl Record for ExtraExpense {
    const KIND: EntryKind = EntryKind::ExtraExpense;
    type Patch = ExtraExpensePatch;

    fn apply(&mut self, patch: ExtraExpensePatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.monthly_amount, patch.monthly_amount);
        merge(&mut self.annual_amount, patch.annual_amount);
    }

    fn list(entries: &Snapshot) -> &Vec<Entry<Self>> {
        &entries.extra_expenses
    }

    fn list_mut(entries: &mut Snapshot) -> &mut Vec<Entry<Self>> {
        &mut entries.extra_expenses
    }
}

impl Record for Investment {
    const KIND: EntryKind = EntryKind::Investment;
    type Patch = InvestmentPatch;

    fn apply(&mut self, patch: InvestmentPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.principal, patch.principal);
        merge(
            &mut self.gross_annual_rate_percent,
            patch.gross_annual_rate_percent,
        );
        merge(&mut self.tax_percent, patch.tax_percent);
        merge(&mut self.interest_mode, patch.interest_mode);
        merge(
            &mut self.compounding_period_days,
            patch.compounding_period_days,
        );
    }

    fn list(entries: &Snapshot) -> &Vec<Entry<Self>> {
        &entries.investments
    }

    fn list_mut(entries: &mut Snapshot) -> &mut Vec<Entry<Self>> {
        &mut entries.investments
    }
}

impl Record for HumanCapitalIncome {
    const KIND: EntryKind = EntryKind::HumanCapital;
    type Patch = HumanCapitalPatch;

    fn apply(&mut self, patch: HumanCapitalPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.net_monthly_income, patch.net_monthly_income);
    }

    fn list(entries: &Snapshot) -> &Vec<Entry<Self>> {
        &entries.human_capital
    }

    fn list_mut(entries: &mut Snapshot) -> &mut Vec<Entry<Self>> {
        &mut entries.human_capital
    }
}

fn fresh_id() -> EntryId {
    Uuid::new_v4().simple().to_string()
}

// Given ids survive unless blank or already taken.
fn reassign_ids<T>(entries: &mut [Entry<T>], seen: &mut HashSet<EntryId>) {
    for entry in entries {
        if entry.id.trim().is_empty() || seen.contains(&entry.id) {
            entry.id = fresh_id();
        }
        seen.insert(entry.id.clone());
    }
}

pub struct EntryStore<C: EntryCache> {
    scope: Scope,
    entries: Snapshot,
    cache: C,
}

impl<C: EntryCache> EntryStore<C> {
    pub fn open(scope: Scope, cache: C) -> Self {
        let mut store = Self {
            scope: Scope::Anonymous,
            entries: Snapshot::default(),
            cache,
        };
        store.switch_scope(scope);
        store
    }

    pub fn switch_scope(&mut self, scope: Scope) {
        self.entries = match self.cache.restore(&scope) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(scope = %scope.key(), error = %e, "failed to restore cached entries");
                Snapshot::default()
            }
        };
        self.scope = scope;
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn entries(&self) -> &Snapshot {
        &self.entries
    }

    pub fn snapshot(&self) -> Snapshot {
        self.entries.clone()
    }

    pub fn list<T: Record>(&self) -> &[Entry<T>] {
        T::list(&self.entries)
    }

    pub fn get<T: Record>(&self, id: &str) -> Option<&Entry<T>> {
        T::list(&self.entries).iter().find(|e| e.id == id)
    }

    pub fn results(&self) -> Results {
        self.entries.results()
    }

    pub fn add<T: Record>(&mut self, data: T) -> Entry<T> {
        let entry = Entry::new(fresh_id(), data);
        T::list_mut(&mut self.entries).push(entry.clone());
        debug!(kind = %T::KIND, id = %entry.id, "entry added");
        self.persist(T::KIND);
        entry
    }

    pub fn update<T: Record>(&mut self, id: &str, patch: T::Patch) -> Result<()> {
        let Some(entry) = T::list_mut(&mut self.entries)
            .iter_mut()
            .find(|e| e.id == id)
        else {
            return Err(Error::not_found(format!("no {} entry with id {id}", T::KIND)));
        };
        entry.data.apply(patch);
        debug!(kind = %T::KIND, %id, "entry updated");
        self.persist(T::KIND);
        Ok(())
    }

    /// Returns whether an entry was removed.
    pub fn remove<T: Record>(&mut self, id: &str) -> bool {
        let list = T::list_mut(&mut self.entries);
        let before = list.len();
        list.retain(|e| e.id != id);
        let removed = list.len() != before;
        if removed {
            debug!(kind = %T::KIND, %id, "entry removed");
            self.persist(T::KIND);
        }
        removed
    }

    pub fn clear_all(&mut self) {
        self.entries = Snapshot::default();
        self.persist_all();
    }

    pub fn replace_all(&mut self, mut snapshot: Snapshot) {
        let mut seen = HashSet::new();
        reassign_ids(&mut snapshot.human_capital, &mut seen);
        reassign_ids(&mut snapshot.properties, &mut seen);
        reassign_ids(&mut snapshot.extra_expenses, &mut seen);
        reassign_ids(&mut snapshot.investments, &mut seen);

        self.entries = snapshot;
        self.persist_all();
    }

    fn persist_all(&mut self) {
        for kind in EntryKind::ALL {
            self.persist(kind);
        }
    }

    fn persist(&mut self, kind: EntryKind) {
        if let Err(e) = self.cache.store(&self.scope, kind, &self.entries) {
            warn!(scope = %self.scope.key(), %kind, error = %e, "failed to cache entries");
        }
    }
}
