//! In-process stand-in for the XYZ Bank demo.
//!
//! [`BankSimulator`] implements [`BrowserDriver`] without a browser. It keeps
//! the bank's data and the current screen's UI state, renders that screen
//! as HTML carrying the application's markup hooks (`ng-click`, `ng-model`,
//! ids and classes), and resolves selectors against the rendered document
//! with `scraper`. Every call renders afresh, so page objects see the same
//! re-resolve-on-every-query behaviour a live tab gives them.
//!
//! Behaviour reproduced: seeded customers and accounts, the login, account,
//! transactions and manager screens, deposit and withdrawal messages, add
//! customer with duplicate detection, open account, customer search,
//! native constraint validation per engine, alerts that block the page until
//! answered, and a short network-busy period after every navigation.

use crate::config::{BrowserEngine, SuiteConfig};
use crate::data::{self, messages, Currency, FieldKind};
use crate::dialog::Dialog;
use crate::driver::{BrowserDriver, Screenshot};
use crate::locator::{BoundingBox, Selector};
use crate::model::TransactionType;
use crate::result::{TellerError, TellerResult};
use crate::wait::LoadState;
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageEncoder, Rgb, RgbImage};
use scraper::{ElementRef, Html};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;

/// Polls of [`LoadState::NetworkIdle`] answered "busy" after a navigation
const BUSY_POLLS: u32 = 2;

/// Display format of transaction timestamps
const TIMESTAMP_FORMAT: &str = "%b %-d, %Y %-I:%M:%S %p";

/// Value format of `datetime-local` inputs
const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Form controls: elements with a box even when they hold no text
const CONTROL_TAGS: [&str; 4] = ["input", "select", "textarea", "button"];

/// Class rules of the application's stylesheet that tests observe
const STYLESHEET: [(&str, &str, &str); 3] = [
    ("error", "color", "rgb(255, 0, 0)"),
    ("fontBig", "font-size", "18px"),
    ("mainHeading", "font-size", "30px"),
];

/// Inherited defaults
const DEFAULT_STYLES: [(&str, &str); 2] = [("color", "rgb(51, 51, 51)"), ("font-size", "14px")];

const ROW_HEIGHT: f64 = 24.0;
const BOX_HEIGHT: f64 = 20.0;
const INDENT: f64 = 8.0;

// =============================================================================
// Bank data
// =============================================================================

#[derive(Debug, Clone)]
struct CustomerRecord {
    id: u32,
    first_name: String,
    last_name: String,
    post_code: String,
    accounts: Vec<u32>,
}

impl CustomerRecord {
    fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone)]
struct AccountRecord {
    currency: Currency,
    balance: i64,
    transactions: Vec<TxRecord>,
}

#[derive(Debug, Clone)]
struct TxRecord {
    seq: u64,
    at: NaiveDateTime,
    amount: i64,
    kind: TransactionType,
}

#[derive(Debug)]
struct Bank {
    customers: Vec<CustomerRecord>,
    accounts: BTreeMap<u32, AccountRecord>,
    next_customer_id: u32,
    next_account_number: u32,
    next_seq: u64,
}

impl Bank {
    fn seeded() -> Self {
        let mut bank = Self {
            customers: Vec::new(),
            accounts: BTreeMap::new(),
            next_customer_id: 1,
            next_account_number: 1001,
            next_seq: 0,
        };
        let seed = [
            ("Hermoine", "Granger", "E859AB"),
            ("Harry", "Potter", "E725JB"),
            ("Ron", "Weasly", "E55555"),
            ("Albus", "Dumbledore", "E55656"),
            ("Neville", "Longbottom", "E89898"),
        ];
        for (first, last, post) in seed {
            if let Some(id) = bank.add_customer(first, last, post) {
                for currency in Currency::ALL {
                    let _ = bank.open_account(id, currency);
                }
            }
        }
        let history = [
            ("2015-01-01 00:00:00", 5000, TransactionType::Credit),
            ("2015-01-02 10:15:30", 1000, TransactionType::Credit),
            ("2015-01-05 14:02:11", 904, TransactionType::Debit),
        ];
        for (at, amount, kind) in history {
            if let Ok(at) = NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M:%S") {
                let _ = bank.post(1001, amount, kind, at);
            }
        }
        bank
    }

    fn customer(&self, id: u32) -> Option<&CustomerRecord> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// `None` when first name, last name and post code all match a customer
    fn add_customer(&mut self, first: &str, last: &str, post: &str) -> Option<u32> {
        let duplicate = self
            .customers
            .iter()
            .any(|c| c.first_name == first && c.last_name == last && c.post_code == post);
        if duplicate {
            return None;
        }
        let id = self.next_customer_id;
        self.next_customer_id += 1;
        self.customers.push(CustomerRecord {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            post_code: post.to_string(),
            accounts: Vec::new(),
        });
        Some(id)
    }

    fn delete_customer(&mut self, id: u32) {
        if let Some(pos) = self.customers.iter().position(|c| c.id == id) {
            let removed = self.customers.remove(pos);
            for number in removed.accounts {
                let _ = self.accounts.remove(&number);
            }
        }
    }

    fn open_account(&mut self, customer_id: u32, currency: Currency) -> Option<u32> {
        let customer = self.customers.iter_mut().find(|c| c.id == customer_id)?;
        let number = self.next_account_number;
        self.next_account_number += 1;
        customer.accounts.push(number);
        let _ = self.accounts.insert(
            number,
            AccountRecord {
                currency,
                balance: 0,
                transactions: Vec::new(),
            },
        );
        Some(number)
    }

    /// Apply a transaction; debits larger than the balance and credits the
    /// balance cannot hold are refused
    fn post(&mut self, number: u32, amount: i64, kind: TransactionType, at: NaiveDateTime) -> bool {
        let seq = self.next_seq;
        let Some(account) = self.accounts.get_mut(&number) else {
            return false;
        };
        let balance = match kind {
            TransactionType::Credit => account.balance.checked_add(amount),
            TransactionType::Debit if amount > account.balance => None,
            TransactionType::Debit => account.balance.checked_sub(amount),
        };
        let Some(balance) = balance else {
            return false;
        };
        account.balance = balance;
        account.transactions.push(TxRecord { seq, at, amount, kind });
        self.next_seq += 1;
        true
    }
}

// =============================================================================
// Screens and UI state
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Blank,
    Login,
    Customer,
    Account,
    Transactions,
    Manager,
    AddCustomer,
    OpenAccount,
    CustomerList,
}

impl Route {
    const fn fragment(self) -> &'static str {
        match self {
            Self::Blank => "",
            Self::Login => "#/login",
            Self::Customer => "#/customer",
            Self::Account => "#/account",
            Self::Transactions => "#/listTx",
            Self::Manager => "#/manager",
            Self::AddCustomer => "#/manager/addCust",
            Self::OpenAccount => "#/manager/openAccount",
            Self::CustomerList => "#/manager/list",
        }
    }

    /// Unknown fragments fall back to the login screen
    fn from_fragment(fragment: &str) -> Self {
        match fragment.trim_end_matches('/') {
            "#/customer" => Self::Customer,
            "#/account" => Self::Account,
            "#/listTx" => Self::Transactions,
            "#/manager" => Self::Manager,
            "#/manager/addCust" => Self::AddCustomer,
            "#/manager/openAccount" => Self::OpenAccount,
            "#/manager/list" => Self::CustomerList,
            _ => Self::Login,
        }
    }

    const fn needs_customer(self) -> bool {
        matches!(self, Self::Account | Self::Transactions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum AccountTab {
    #[default]
    None,
    Deposit,
    Withdraw,
}

#[derive(Debug, Default)]
struct Ui {
    login_choice: Option<u32>,
    customer: Option<u32>,
    account: Option<u32>,
    tab: AccountTab,
    amount: String,
    message: String,
    first_name: String,
    last_name: String,
    post_code: String,
    open_customer: Option<u32>,
    open_currency: Option<Currency>,
    search: String,
    sort_reverse: bool,
    start: String,
    end: String,
}

#[derive(Debug)]
struct SimState {
    route: Route,
    bank: Bank,
    ui: Ui,
    open_dialog: Option<Dialog>,
    busy_polls: u32,
    closed: bool,
}

/// Everything an interaction needs to know about the element it hit.
/// Extracted while the rendered document is alive, used after it is gone.
#[derive(Debug, Default)]
struct Target {
    tag: String,
    id: Option<String>,
    input_type: Option<String>,
    ng_click: Option<String>,
    ng_model: Option<String>,
    data_id: Option<String>,
    submit_action: Option<String>,
    form_valid: bool,
    visible: bool,
    required: bool,
    value: String,
    options: Vec<(String, String)>,
}

impl Target {
    fn is_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }

    fn field_kind(&self) -> FieldKind {
        match (self.tag.as_str(), self.input_type.as_deref()) {
            ("select", _) => FieldKind::Select,
            (_, Some("number")) => FieldKind::Number,
            _ => FieldKind::Text,
        }
    }

    fn validation_message(&self, engine: BrowserEngine) -> String {
        if !self.is_control() {
            return String::new();
        }
        let kind = self.field_kind();
        if self.required && self.value.is_empty() {
            return data::required_field_message(engine, kind).to_string();
        }
        if kind == FieldKind::Number {
            if let Ok(number) = self.value.parse::<f64>() {
                if number.fract() != 0.0 {
                    return data::step_mismatch_message(engine, number);
                }
            }
        }
        String::new()
    }
}

// =============================================================================
// Simulator
// =============================================================================

/// In-process [`BrowserDriver`] reproducing the XYZ Bank demo.
pub struct BankSimulator {
    engine: BrowserEngine,
    base_url: String,
    viewport: (u32, u32),
    action_timeout: Duration,
    poll_interval: Duration,
    state: Mutex<SimState>,
    dialogs: broadcast::Sender<Dialog>,
}

impl std::fmt::Debug for BankSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankSimulator")
            .field("engine", &self.engine)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl BankSimulator {
    /// Fresh bank, blank tab
    #[must_use]
    pub fn new(config: &SuiteConfig) -> Self {
        let (dialogs, _) = broadcast::channel(16);
        Self {
            engine: config.engine,
            base_url: format!("{}/", config.base_url.trim_end_matches('/')),
            viewport: (config.viewport_width.max(1), config.viewport_height.max(1)),
            action_timeout: config.action_timeout(),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            state: Mutex::new(SimState {
                route: Route::Blank,
                bank: Bank::seeded(),
                ui: Ui::default(),
                open_dialog: None,
                busy_polls: 0,
                closed: false,
            }),
            dialogs,
        }
    }

    /// Open a native alert, as the application does after add customer or
    /// open account
    pub fn raise_alert(&self, message: impl Into<String>) {
        let dialog = Dialog::alert(message);
        if let Ok(mut state) = self.state.lock() {
            state.open_dialog = Some(dialog.clone());
        }
        tracing::debug!(message = dialog.message(), "alert opened");
        // no receivers just means nobody is listening
        let _ = self.dialogs.send(dialog);
    }

    /// Whether a dialog is waiting for an answer
    #[must_use]
    pub fn has_open_dialog(&self) -> bool {
        self.state
            .lock()
            .map(|state| state.open_dialog.is_some())
            .unwrap_or(false)
    }

    /// Block like a live tab does while an alert is showing: the action
    /// that opened it returns once the alert is answered, or fails after the
    /// action timeout with the alert still open
    async fn await_dialog_answer(&self, message: &str) -> TellerResult<()> {
        let answered = async {
            while self.has_open_dialog() {
                tokio::time::sleep(self.poll_interval).await;
            }
        };
        tokio::time::timeout(self.action_timeout, answered)
            .await
            .map_err(|_| TellerError::Timeout {
                ms: self.action_timeout.as_millis() as u64,
                waited_for: format!("alert {message:?} to be answered"),
            })
    }

    fn lock(&self) -> TellerResult<MutexGuard<'_, SimState>> {
        self.state
            .lock()
            .map_err(|_| TellerError::driver("simulator state poisoned"))
    }

    /// Lock the state for a DOM operation
    fn page(&self) -> TellerResult<MutexGuard<'_, SimState>> {
        let state = self.lock()?;
        if state.closed {
            return Err(TellerError::driver("target page has been closed"));
        }
        if let Some(dialog) = &state.open_dialog {
            return Err(TellerError::driver(format!(
                "page is blocked by an open {} dialog: {}",
                dialog.dialog_type(),
                dialog.message()
            )));
        }
        Ok(state)
    }

    /// Render the current screen, resolve `selector` and hand the matches to `f`
    fn query<T>(
        &self,
        selector: &Selector,
        f: impl FnOnce(&[ElementRef<'_>]) -> T,
    ) -> TellerResult<T> {
        let html = self.page()?.render();
        let doc = Html::parse_document(&html);
        let matches = resolve(&doc, selector)?;
        Ok(f(&matches))
    }

    /// First match of `selector`, described as a [`Target`]
    fn target(&self, state: &SimState, selector: &Selector) -> TellerResult<Target> {
        let doc = Html::parse_document(&state.render());
        let matches = resolve(&doc, selector)?;
        let el = matches
            .first()
            .ok_or_else(|| TellerError::locator(selector.to_string(), "no element matches"))?;
        Ok(describe(*el, self.engine))
    }

    /// Resolve a target for an interaction: it must exist and be visible
    fn interactive_target(&self, state: &SimState, selector: &Selector) -> TellerResult<Target> {
        let target = self.target(state, selector)?;
        if !target.visible {
            return Err(TellerError::locator(selector.to_string(), "element is not visible"));
        }
        Ok(target)
    }

    fn wireframe(&self, boxes: &[BoundingBox]) -> TellerResult<Vec<u8>> {
        let (width, height) = self.viewport;
        let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        let edge = Rgb([180, 180, 180]);
        for b in boxes {
            let (x0, y0) = (b.x as u32, b.y as u32);
            let (x1, y1) = ((b.x + b.width) as u32, (b.y + b.height) as u32);
            if x0 >= width || y0 >= height {
                continue;
            }
            let (x1, y1) = (x1.min(width - 1), y1.min(height - 1));
            for x in x0..=x1 {
                img.put_pixel(x, y0, edge);
                img.put_pixel(x, y1, edge);
            }
            for y in y0..=y1 {
                img.put_pixel(x0, y, edge);
                img.put_pixel(x1, y, edge);
            }
        }
        let mut buffer = Vec::new();
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Fast, FilterType::NoFilter)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| TellerError::driver(format!("failed to encode screenshot: {e}")))?;
        Ok(buffer)
    }
}

#[async_trait]
impl BrowserDriver for BankSimulator {
    fn engine(&self) -> BrowserEngine {
        self.engine
    }

    async fn navigate(&self, url: &str) -> TellerResult<()> {
        let mut state = self.lock()?;
        if state.closed {
            return Err(TellerError::driver("target page has been closed"));
        }
        let route = if url == "about:blank" {
            Route::Blank
        } else {
            let root = self.base_url.trim_end_matches('/');
            let rest = url.strip_prefix(root).ok_or_else(|| TellerError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })?;
            let rest = rest.trim_start_matches('/');
            let rest = rest.strip_prefix("index.html").unwrap_or(rest);
            if !rest.is_empty() && !rest.starts_with('#') {
                return Err(TellerError::Navigation {
                    url: url.to_string(),
                    message: "HTTP 404".to_string(),
                });
            }
            Route::from_fragment(rest)
        };
        // a reload keeps the bank but loses the screen state
        state.open_dialog = None;
        state.ui = Ui::default();
        state.go(route);
        tracing::debug!(route = route.fragment(), "simulator navigated");
        Ok(())
    }

    async fn current_url(&self) -> TellerResult<String> {
        let state = self.lock()?;
        Ok(match state.route {
            Route::Blank => "about:blank".to_string(),
            route => format!("{}{}", self.base_url, route.fragment()),
        })
    }

    async fn load_state_reached(&self, state: LoadState) -> TellerResult<bool> {
        let mut sim = self.lock()?;
        Ok(match state {
            LoadState::DomContentLoaded => true,
            LoadState::NetworkIdle if sim.busy_polls > 0 => {
                sim.busy_polls -= 1;
                false
            }
            LoadState::NetworkIdle => true,
        })
    }

    async fn count(&self, selector: &Selector) -> TellerResult<usize> {
        self.query(selector, |els| els.len())
    }

    async fn is_visible(&self, selector: &Selector) -> TellerResult<bool> {
        self.query(selector, |els| els.first().is_some_and(|el| is_rendered(*el)))
    }

    async fn text_content(&self, selector: &Selector) -> TellerResult<Option<String>> {
        self.query(selector, |els| els.first().map(|el| text_of(*el)))
    }

    async fn all_text_contents(&self, selector: &Selector) -> TellerResult<Vec<String>> {
        self.query(selector, |els| els.iter().map(|el| text_of(*el)).collect())
    }

    async fn click(&self, selector: &Selector) -> TellerResult<()> {
        let alert = {
            let mut state = self.page()?;
            let target = self.interactive_target(&state, selector)?;
            state.click(&target)
        };
        match alert {
            Some(message) => {
                self.raise_alert(message.as_str());
                self.await_dialog_answer(&message).await
            }
            None => Ok(()),
        }
    }

    async fn fill(&self, selector: &Selector, value: &str) -> TellerResult<()> {
        let mut state = self.page()?;
        let target = self.interactive_target(&state, selector)?;
        state.fill(&target, value)
    }

    async fn select_option(&self, selector: &Selector, label: &str) -> TellerResult<()> {
        let mut state = self.page()?;
        let target = self.interactive_target(&state, selector)?;
        let label = label.trim();
        let value = target
            .options
            .iter()
            .find(|(_, text)| text == label)
            .map(|(value, _)| value.clone())
            .ok_or_else(|| {
                TellerError::locator(selector.to_string(), format!("no option labelled {label:?}"))
            })?;
        state.select(&target, &value)
    }

    async fn input_value(&self, selector: &Selector) -> TellerResult<String> {
        let state = self.page()?;
        let target = self.target(&state, selector)?;
        if !target.is_control() {
            return Err(TellerError::driver(format!(
                "{selector} is not an <input>, <select> or <textarea> element"
            )));
        }
        Ok(target.value)
    }

    async fn validation_message(&self, selector: &Selector) -> TellerResult<String> {
        let state = self.page()?;
        Ok(self.target(&state, selector)?.validation_message(self.engine))
    }

    async fn computed_style(&self, selector: &Selector, property: &str) -> TellerResult<String> {
        let html = self.page()?.render();
        let doc = Html::parse_document(&html);
        let matches = resolve(&doc, selector)?;
        let el = matches
            .first()
            .ok_or_else(|| TellerError::locator(selector.to_string(), "no element matches"))?;
        Ok(computed_style(*el, property))
    }

    async fn bounding_box(&self, selector: &Selector) -> TellerResult<Option<BoundingBox>> {
        let width = f64::from(self.viewport.0);
        let html = self.page()?.render();
        let doc = Html::parse_document(&html);
        let matches = resolve(&doc, selector)?;
        let Some(el) = matches.first() else {
            return Ok(None);
        };
        Ok(layout(&doc, width)
            .into_iter()
            .find(|(laid, _)| laid == el)
            .map(|(_, b)| b))
    }

    async fn screenshot(&self) -> TellerResult<Screenshot> {
        let html = self.page()?.render();
        let boxes: Vec<BoundingBox> = {
            let doc = Html::parse_document(&html);
            layout(&doc, f64::from(self.viewport.0))
                .into_iter()
                .map(|(_, b)| b)
                .collect()
        };
        Ok(Screenshot::new(self.wireframe(&boxes)?))
    }

    fn subscribe_dialogs(&self) -> broadcast::Receiver<Dialog> {
        self.dialogs.subscribe()
    }

    async fn accept_dialog(&self, prompt_text: Option<String>) -> TellerResult<()> {
        let mut state = self.lock()?;
        let dialog = state
            .open_dialog
            .take()
            .ok_or_else(|| TellerError::driver("no dialog is showing"))?;
        tracing::debug!(message = dialog.message(), prompt_text = ?prompt_text, "dialog accepted");
        Ok(())
    }

    async fn dismiss_dialog(&self) -> TellerResult<()> {
        let mut state = self.lock()?;
        let dialog = state
            .open_dialog
            .take()
            .ok_or_else(|| TellerError::driver("no dialog is showing"))?;
        tracing::debug!(message = dialog.message(), "dialog dismissed");
        Ok(())
    }

    async fn close(&self) -> TellerResult<()> {
        let mut state = self.lock()?;
        state.closed = true;
        state.open_dialog = None;
        Ok(())
    }
}

// =============================================================================
// State transitions
// =============================================================================

impl SimState {
    /// Switch screens, resetting the state owned by the screen being entered
    fn go(&mut self, route: Route) {
        let route = if route.needs_customer() && self.ui.customer.is_none() {
            Route::Customer
        } else {
            route
        };
        match route {
            Route::Customer => self.ui.login_choice = None,
            Route::Account => {
                self.ui.tab = AccountTab::None;
                self.ui.amount.clear();
                self.ui.message.clear();
            }
            Route::Transactions => {
                self.ui.sort_reverse = false;
                self.ui.start.clear();
                self.ui.end.clear();
            }
            Route::AddCustomer => {
                self.ui.first_name.clear();
                self.ui.last_name.clear();
                self.ui.post_code.clear();
            }
            Route::OpenAccount => {
                self.ui.open_customer = None;
                self.ui.open_currency = None;
            }
            Route::CustomerList => self.ui.search.clear(),
            Route::Blank | Route::Login | Route::Manager => {}
        }
        self.route = route;
        self.busy_polls = if route == Route::Blank { 0 } else { BUSY_POLLS };
    }

    /// Returns the alert the application raises, if any
    fn click(&mut self, target: &Target) -> Option<String> {
        if let Some(action) = &target.submit_action {
            if !target.form_valid {
                tracing::debug!(action, "submit blocked by constraint validation");
                return None;
            }
            return self.submit(action);
        }
        let action = target.ng_click.as_deref()?;
        match action {
            "customer()" => self.go(Route::Customer),
            "manager()" => self.go(Route::Manager),
            "home()" => {
                self.ui.customer = None;
                self.go(Route::Login);
            }
            "byebye()" => {
                self.ui.customer = None;
                self.ui.account = None;
                self.go(Route::Customer);
            }
            "transactions()" => self.go(Route::Transactions),
            "back()" => self.go(Route::Account),
            "deposit()" => self.switch_tab(AccountTab::Deposit),
            "withdrawl()" => self.switch_tab(AccountTab::Withdraw),
            "reset()" => {
                let account = self.ui.account.and_then(|n| self.bank.accounts.get_mut(&n));
                if let Some(account) = account {
                    account.transactions.clear();
                }
            }
            "addCust()" => self.go(Route::AddCustomer),
            "openAccount()" => self.go(Route::OpenAccount),
            "showCust()" => self.go(Route::CustomerList),
            "deleteCust(cust)" => {
                if let Some(id) = target.data_id.as_deref().and_then(|id| id.parse().ok()) {
                    self.bank.delete_customer(id);
                }
            }
            sort if sort.contains("sortReverse") => self.ui.sort_reverse = !self.ui.sort_reverse,
            other => tracing::trace!(action = other, "click without effect"),
        }
        None
    }

    fn switch_tab(&mut self, tab: AccountTab) {
        self.ui.tab = tab;
        self.ui.amount.clear();
        self.ui.message.clear();
    }

    fn submit(&mut self, action: &str) -> Option<String> {
        match action {
            "showAccount()" => {
                let customer = self.ui.login_choice?;
                self.ui.customer = Some(customer);
                self.ui.account = self
                    .bank
                    .customer(customer)
                    .and_then(|c| c.accounts.first().copied());
                self.go(Route::Account);
                None
            }
            "deposit()" => {
                let amount = self.take_amount()?;
                let account = self.ui.account?;
                let now = Local::now().naive_local();
                if self.bank.post(account, amount, TransactionType::Credit, now) {
                    self.ui.message = messages::DEPOSIT_SUCCESS.to_string();
                }
                None
            }
            "withdrawl()" => {
                let amount = self.take_amount()?;
                let account = self.ui.account?;
                let now = Local::now().naive_local();
                self.ui.message = if self.bank.post(account, amount, TransactionType::Debit, now) {
                    messages::WITHDRAWAL_SUCCESS.to_string()
                } else {
                    messages::INSUFFICIENT_FUNDS.to_string()
                };
                None
            }
            "addCustomer()" => {
                let added = self
                    .bank
                    .add_customer(&self.ui.first_name, &self.ui.last_name, &self.ui.post_code);
                Some(match added {
                    Some(id) => {
                        self.ui.first_name.clear();
                        self.ui.last_name.clear();
                        self.ui.post_code.clear();
                        format!("{}{id}", messages::CUSTOMER_ADDED)
                    }
                    None => messages::DUPLICATE_CUSTOMER.to_string(),
                })
            }
            "process()" => {
                let (customer, currency) = (self.ui.open_customer?, self.ui.open_currency?);
                let number = self.bank.open_account(customer, currency)?;
                self.ui.open_customer = None;
                self.ui.open_currency = None;
                Some(format!("{}{number}", messages::ACCOUNT_CREATED))
            }
            other => {
                tracing::trace!(action = other, "submit without effect");
                None
            }
        }
    }

    /// Consume the amount input; the form clears it after every submit.
    /// Fractional amounts and amounts outside the `i64` range post nothing.
    fn take_amount(&mut self) -> Option<i64> {
        let amount = std::mem::take(&mut self.ui.amount);
        let amount = amount.trim();
        if let Ok(whole) = amount.parse::<i64>() {
            return Some(whole);
        }
        let amount = amount.parse::<f64>().ok()?;
        let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&amount);
        (in_range && amount.fract() == 0.0).then_some(amount as i64)
    }

    fn fill(&mut self, target: &Target, value: &str) -> TellerResult<()> {
        if !matches!(target.tag.as_str(), "input" | "textarea") {
            return Err(TellerError::driver(format!(
                "<{}> is not an <input> or <textarea> element",
                target.tag
            )));
        }
        match target.input_type.as_deref() {
            Some("number") if !value.is_empty() && value.trim().parse::<f64>().is_err() => {
                return Err(TellerError::driver("cannot type text into input[type=number]"));
            }
            Some("datetime-local")
                if !value.is_empty()
                    && NaiveDateTime::parse_from_str(value, DATETIME_LOCAL_FORMAT).is_err() =>
            {
                return Err(TellerError::driver(format!("malformed value {value:?}")));
            }
            _ => {}
        }
        let slot = match target.ng_model.as_deref() {
            Some("amount") => &mut self.ui.amount,
            Some("fName") => &mut self.ui.first_name,
            Some("lName") => &mut self.ui.last_name,
            Some("postCd") => &mut self.ui.post_code,
            Some("searchCustomer") => &mut self.ui.search,
            Some("startDate") => &mut self.ui.start,
            Some("end") => &mut self.ui.end,
            _ => return Err(TellerError::driver("input is not bound to the application")),
        };
        *slot = value.to_string();
        Ok(())
    }

    fn select(&mut self, target: &Target, value: &str) -> TellerResult<()> {
        if target.tag != "select" {
            return Err(TellerError::driver(format!("<{}> is not a <select> element", target.tag)));
        }
        match (target.id.as_deref(), self.route) {
            (Some("userSelect"), Route::Customer) => self.ui.login_choice = value.parse().ok(),
            (Some("userSelect"), Route::OpenAccount) => self.ui.open_customer = value.parse().ok(),
            (Some("currency"), _) => self.ui.open_currency = value.parse().ok(),
            (Some("accountSelect"), _) => {
                if let Ok(number) = value.trim_start_matches("number:").parse() {
                    self.ui.account = Some(number);
                }
            }
            _ => return Err(TellerError::driver("select is not bound to the application")),
        }
        Ok(())
    }

    /// Transactions of the selected account after filter and sort
    fn visible_transactions(&self) -> Vec<TxRecord> {
        let Some(account) = self.ui.account.and_then(|n| self.bank.accounts.get(&n)) else {
            return Vec::new();
        };
        let start = NaiveDateTime::parse_from_str(&self.ui.start, DATETIME_LOCAL_FORMAT).ok();
        let end = NaiveDateTime::parse_from_str(&self.ui.end, DATETIME_LOCAL_FORMAT)
            .ok()
            .map(|end| end + chrono::Duration::minutes(1));
        let mut rows: Vec<TxRecord> = account
            .transactions
            .iter()
            .filter(|tx| start.is_none_or(|s| tx.at >= s) && end.is_none_or(|e| tx.at < e))
            .cloned()
            .collect();
        rows.sort_by_key(|tx| (tx.at, tx.seq));
        if self.ui.sort_reverse {
            rows.reverse();
        }
        rows
    }
}

// =============================================================================
// Rendering
// =============================================================================

fn esc(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `ng-hide` class suffix
const fn hidden_unless(visible: bool) -> &'static str {
    if visible {
        ""
    } else {
        " ng-hide"
    }
}

const fn selected_if(selected: bool) -> &'static str {
    if selected {
        " selected"
    } else {
        ""
    }
}

impl SimState {
    fn render(&self) -> String {
        if self.route == Route::Blank {
            return "<html><head></head><body></body></html>".to_string();
        }
        let mut html = String::with_capacity(4096);
        html.push_str(r#"<html><head><title>XYZ Bank</title></head><body ng-app="BankingProject">"#);
        html.push_str(r#"<div class="container-fluid"><div class="border box mainhdr">"#);
        html.push_str(r#"<button class="btn home" ng-click="home()">Home</button>"#);
        html.push_str(r#"<strong class="mainHeading">XYZ Bank</strong>"#);
        let logged_in = self.ui.customer.is_some() && self.route.needs_customer();
        let _ = write!(
            html,
            r#"<button class="btn logout{}" ng-show="logout" ng-click="byebye()">Logout</button>"#,
            hidden_unless(logged_in)
        );
        html.push_str(r#"</div><div class="ng-scope" ui-view="">"#);
        match self.route {
            Route::Blank => {}
            Route::Login => render_login(&mut html),
            Route::Customer => self.render_customer_login(&mut html),
            Route::Account => self.render_account(&mut html),
            Route::Transactions => self.render_transactions(&mut html),
            Route::Manager | Route::AddCustomer | Route::OpenAccount | Route::CustomerList => {
                self.render_manager(&mut html);
            }
        }
        html.push_str("</div></div></body></html>");
        html
    }

    fn render_customer_login(&self, html: &mut String) {
        html.push_str(r#"<div class="form-group"><form name="myForm" ng-submit="showAccount()">"#);
        html.push_str(r#"<label>Your Name :</label>"#);
        html.push_str(r#"<select class="form-control" ng-model="custId" id="userSelect" required>"#);
        let _ = write!(
            html,
            r#"<option value=""{}>---Your Name---</option>"#,
            selected_if(self.ui.login_choice.is_none())
        );
        for c in &self.bank.customers {
            let _ = write!(
                html,
                r#"<option value="{}"{}>{}</option>"#,
                c.id,
                selected_if(self.ui.login_choice == Some(c.id)),
                esc(&c.full_name())
            );
        }
        html.push_str("</select>");
        let _ = write!(
            html,
            r#"<button type="submit" class="btn btn-default{}" ng-show="custId != ''">Login</button>"#,
            hidden_unless(self.ui.login_choice.is_some())
        );
        html.push_str("</form></div>");
    }

    fn render_account(&self, html: &mut String) {
        let Some(customer) = self.ui.customer.and_then(|id| self.bank.customer(id)) else {
            return;
        };
        html.push_str(r#"<div class="center"><strong>Welcome "#);
        let _ = write!(
            html,
            r#"<span class="fontBig ng-binding">{}</span> !!</strong>"#,
            esc(&customer.full_name())
        );
        let has_accounts = !customer.accounts.is_empty();
        let _ = write!(
            html,
            r#"<select id="accountSelect" ng-model="accountNo" class="{}">"#,
            if has_accounts { "" } else { "ng-hide" }
        );
        for number in &customer.accounts {
            let _ = write!(
                html,
                r#"<option value="number:{number}"{}>{number}</option>"#,
                selected_if(self.ui.account == Some(*number))
            );
        }
        html.push_str("</select></div>");

        let account = self.ui.account.and_then(|n| self.bank.accounts.get(&n).map(|a| (n, a)));
        let Some((number, account)) = account else {
            html.push_str(r#"<div class="center"><span class="error">Please open an account with us.</span></div>"#);
            return;
        };
        let _ = write!(
            html,
            r#"<div class="center">Account Number : <strong class="ng-binding">{number}</strong> , Balance : <strong class="ng-binding">{}</strong> , Currency : <strong class="ng-binding">{}</strong></div>"#,
            account.balance, account.currency
        );
        html.push_str(r#"<div class="center">"#);
        html.push_str(r#"<button class="btn btn-lg tab" ng-click="transactions()">Transactions</button>"#);
        html.push_str(r#"<button class="btn btn-lg tab" ng-click="deposit()">Deposit</button>"#);
        html.push_str(r#"<button class="btn btn-lg tab" ng-click="withdrawl()">Withdrawl</button>"#);
        html.push_str("</div>");

        let (action, label, button) = match self.ui.tab {
            AccountTab::None => return,
            AccountTab::Deposit => ("deposit()", "Amount to be Deposited :", "Deposit"),
            AccountTab::Withdraw => ("withdrawl()", "Amount to be Withdrawn :", "Withdraw"),
        };
        html.push_str(r#"<div class="container-fluid mainBox"><div class="form-group">"#);
        let _ = write!(
            html,
            r#"<span class="error ng-binding{}" ng-show="message">{}</span>"#,
            hidden_unless(!self.ui.message.is_empty()),
            esc(&self.ui.message)
        );
        let _ = write!(html, r#"</div><form name="myForm" ng-submit="{action}">"#);
        let _ = write!(
            html,
            r#"<div class="form-group"><label>{label}</label><input type="number" class="form-control" ng-model="amount" placeholder="amount" required value="{}"></div>"#,
            esc(&self.ui.amount)
        );
        let _ = write!(html, r#"<button type="submit" class="btn btn-default">{button}</button>"#);
        html.push_str("</form></div>");
    }

    fn render_transactions(&self, html: &mut String) {
        html.push_str(r#"<div class="center">"#);
        html.push_str(r#"<button class="btn" ng-click="back()">Back</button> "#);
        let _ = write!(
            html,
            r#"Start <input type="datetime-local" id="start" ng-model="startDate" value="{}"> "#,
            esc(&self.ui.start)
        );
        let _ = write!(
            html,
            r#"End <input type="datetime-local" id="end" ng-model="end" value="{}"> "#,
            esc(&self.ui.end)
        );
        html.push_str(r#"<button class="btn" ng-click="reset()">Reset</button></div>"#);
        html.push_str(r#"<table class="table table-bordered table-striped"><thead><tr>"#);
        html.push_str(r#"<td><a href="" ng-click="sortType = 'fDate'; sortReverse = !sortReverse">Date-Time</a></td>"#);
        html.push_str("<td>Amount</td><td>Transaction Type</td></tr></thead><tbody>");
        for (i, tx) in self.visible_transactions().iter().enumerate() {
            let _ = write!(
                html,
                r#"<tr id="anchor{i}"><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                tx.at.format(TIMESTAMP_FORMAT),
                tx.amount,
                tx.kind
            );
        }
        html.push_str("</tbody></table>");
    }

    fn render_manager(&self, html: &mut String) {
        html.push_str(r#"<div class="center">"#);
        html.push_str(r#"<button class="btn btn-lg tab" ng-click="addCust()">Add Customer</button>"#);
        html.push_str(r#"<button class="btn btn-lg tab" ng-click="openAccount()">Open Account</button>"#);
        html.push_str(r#"<button class="btn btn-lg tab" ng-click="showCust()">Customers</button>"#);
        html.push_str(r#"</div><div class="ng-scope" ui-view="">"#);
        match self.route {
            Route::AddCustomer => self.render_add_customer(html),
            Route::OpenAccount => self.render_open_account(html),
            Route::CustomerList => self.render_customer_list(html),
            _ => {}
        }
        html.push_str("</div>");
    }

    fn render_add_customer(&self, html: &mut String) {
        html.push_str(r#"<form name="myForm" ng-submit="addCustomer()">"#);
        for (label, model, value) in [
            ("First Name", "fName", &self.ui.first_name),
            ("Last Name", "lName", &self.ui.last_name),
            ("Post Code", "postCd", &self.ui.post_code),
        ] {
            let _ = write!(
                html,
                r#"<div class="form-group"><label>{label} :</label><input type="text" class="form-control" ng-model="{model}" placeholder="{label}" required value="{}"></div>"#,
                esc(value)
            );
        }
        html.push_str(r#"<button type="submit" class="btn btn-default">Add Customer</button></form>"#);
    }

    fn render_open_account(&self, html: &mut String) {
        html.push_str(r#"<form name="myForm" ng-submit="process()"><div class="form-group">"#);
        html.push_str(r#"<label>Customer :</label><select id="userSelect" ng-model="custId" required>"#);
        let _ = write!(
            html,
            r#"<option value=""{}>---Customer Name---</option>"#,
            selected_if(self.ui.open_customer.is_none())
        );
        for c in &self.bank.customers {
            let _ = write!(
                html,
                r#"<option value="{}"{}>{}</option>"#,
                c.id,
                selected_if(self.ui.open_customer == Some(c.id)),
                esc(&c.full_name())
            );
        }
        html.push_str(r#"</select></div><div class="form-group">"#);
        html.push_str(r#"<label>Currency :</label><select id="currency" ng-model="currency" required>"#);
        let _ = write!(
            html,
            r#"<option value=""{}>---Currency---</option>"#,
            selected_if(self.ui.open_currency.is_none())
        );
        for currency in Currency::ALL {
            let _ = write!(
                html,
                r#"<option value="{currency}"{}>{currency}</option>"#,
                selected_if(self.ui.open_currency == Some(currency))
            );
        }
        html.push_str(r#"</select></div><button type="submit">Process</button></form>"#);
    }

    fn render_customer_list(&self, html: &mut String) {
        let _ = write!(
            html,
            r#"<form><div class="input-group"><input type="text" class="form-control" placeholder="Search Customer" ng-model="searchCustomer" value="{}"></div></form>"#,
            esc(&self.ui.search)
        );
        html.push_str(r#"<table class="table table-bordered table-striped"><thead><tr>"#);
        html.push_str("<td>First Name</td><td>Last Name</td><td>Post Code</td><td>Account Number</td><td>Delete Customer</td>");
        html.push_str("</tr></thead><tbody>");
        let term = self.ui.search.to_lowercase();
        let shown = self.bank.customers.iter().filter(|c| {
            [&c.first_name, &c.last_name, &c.post_code]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
        });
        for c in shown {
            let _ = write!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>",
                esc(&c.first_name),
                esc(&c.last_name),
                esc(&c.post_code)
            );
            for number in &c.accounts {
                let _ = write!(html, r#"<span ng-repeat="account in cust.accountNo">{number} </span>"#);
            }
            let _ = write!(
                html,
                r#"</td><td><button ng-click="deleteCust(cust)" data-id="{}">Delete</button></td></tr>"#,
                c.id
            );
        }
        html.push_str("</tbody></table>");
    }
}

fn render_login(html: &mut String) {
    html.push_str(r#"<div class="borderM box padT20">"#);
    html.push_str(r#"<div class="center"><button class="btn btn-primary btn-lg" ng-click="customer()">Customer Login</button></div>"#);
    html.push_str(r#"<div class="center"><button class="btn btn-primary btn-lg" ng-click="manager()">Bank Manager Login</button></div>"#);
    html.push_str("</div>");
}

// =============================================================================
// Document queries
// =============================================================================

fn parse_css(css: &str) -> TellerResult<scraper::Selector> {
    scraper::Selector::parse(css).map_err(|e| TellerError::InvalidSelector {
        selector: css.to_string(),
        message: format!("{e:?}"),
    })
}

/// Matches of `selector` in document order
fn resolve<'a>(doc: &'a Html, selector: &Selector) -> TellerResult<Vec<ElementRef<'a>>> {
    Ok(match selector {
        Selector::Css(css) => doc.select(&parse_css(css)?).collect(),
        Selector::CssWithText { css, text } => doc
            .select(&parse_css(css)?)
            .filter(|el| text_of(*el).contains(text.as_str()))
            .collect(),
        Selector::Nth { base, index } => {
            resolve(doc, base)?.into_iter().nth(*index).into_iter().collect()
        }
        Selector::Descendant { base, css } => {
            let inner = parse_css(css)?;
            resolve(doc, base)?
                .into_iter()
                .flat_map(|el| el.select(&inner).collect::<Vec<_>>())
                .collect()
        }
    })
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect()
}

fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value()
        .attr("class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

/// Element and ancestors carry no `ng-hide`, and the element has a box
fn is_rendered(el: ElementRef<'_>) -> bool {
    if matches!(el.value().name(), "head" | "title" | "script" | "style" | "meta") {
        return false;
    }
    let hidden = std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .any(|e| has_class(e, "ng-hide"));
    if hidden {
        return false;
    }
    let has_text = el.text().any(|t| !t.trim().is_empty());
    has_text
        || el
            .descendants()
            .filter_map(ElementRef::wrap)
            .any(|d| CONTROL_TAGS.contains(&d.value().name()))
}

/// Current value of a form control, as the DOM reports it
fn control_value(el: ElementRef<'_>) -> String {
    match el.value().name() {
        "select" => {
            let options: Vec<ElementRef<'_>> = el
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|o| o.value().name() == "option")
                .collect();
            options
                .iter()
                .find(|o| o.value().attr("selected").is_some())
                .or_else(|| options.first())
                .map(|o| o.value().attr("value").map_or_else(|| text_of(*o), str::to_string))
                .unwrap_or_default()
        }
        "textarea" => text_of(el),
        _ => el.value().attr("value").unwrap_or_default().to_string(),
    }
}

fn describe(el: ElementRef<'_>, engine: BrowserEngine) -> Target {
    let attr = |name: &str| el.value().attr(name).map(str::to_string);
    let tag = el.value().name().to_string();
    let form = el
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "form");
    let is_submit = tag == "button" && el.value().attr("type") == Some("submit");
    let submit_action = if is_submit {
        form.and_then(|f| f.value().attr("ng-submit")).map(str::to_string)
    } else {
        None
    };
    let form_valid = form.is_none_or(|f| {
        f.descendants()
            .filter_map(ElementRef::wrap)
            .filter(|c| matches!(c.value().name(), "input" | "select" | "textarea"))
            .all(|c| describe_control(c).validation_message(engine).is_empty())
    });
    let options = el
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|o| o.value().name() == "option")
        .map(|o| {
            let label = text_of(o).trim().to_string();
            let value = o.value().attr("value").map_or_else(|| label.clone(), str::to_string);
            (value, label)
        })
        .collect();
    Target {
        id: attr("id"),
        ng_click: attr("ng-click"),
        ng_model: attr("ng-model"),
        data_id: attr("data-id"),
        submit_action,
        form_valid,
        visible: is_rendered(el),
        options,
        ..describe_control_with_tag(el, tag)
    }
}

/// The parts of a [`Target`] constraint validation looks at
fn describe_control(el: ElementRef<'_>) -> Target {
    describe_control_with_tag(el, el.value().name().to_string())
}

fn describe_control_with_tag(el: ElementRef<'_>, tag: String) -> Target {
    Target {
        input_type: el.value().attr("type").map(str::to_string),
        required: el.value().attr("required").is_some(),
        value: control_value(el),
        tag,
        ..Target::default()
    }
}

fn computed_style(el: ElementRef<'_>, property: &str) -> String {
    if property == "display" {
        return if !is_rendered(el) {
            "none"
        } else if matches!(el.value().name(), "span" | "strong" | "a" | "label") {
            "inline"
        } else if matches!(el.value().name(), "button" | "input" | "select") {
            "inline-block"
        } else {
            "block"
        }
        .to_string();
    }
    // nearest element (self first) with a matching class rule wins
    let lineage = std::iter::once(el).chain(el.ancestors().filter_map(ElementRef::wrap));
    for e in lineage {
        let rule = STYLESHEET
            .iter()
            .find(|(class, prop, _)| *prop == property && has_class(e, class));
        if let Some((_, _, value)) = rule {
            return (*value).to_string();
        }
    }
    DEFAULT_STYLES
        .iter()
        .find(|(prop, _)| *prop == property)
        .map(|(_, value)| (*value).to_string())
        .unwrap_or_default()
}

/// Rendered elements stacked in document order, indented by depth
fn layout(doc: &Html, viewport_width: f64) -> Vec<(ElementRef<'_>, BoundingBox)> {
    let mut boxes = Vec::new();
    let Ok(body) = parse_css("body") else {
        return boxes;
    };
    let Some(body) = doc.select(&body).next() else {
        return boxes;
    };
    for el in body.descendants().filter_map(ElementRef::wrap) {
        if !is_rendered(el) {
            continue;
        }
        let depth = el.ancestors().count() as f64;
        let x = depth * INDENT;
        let y = boxes.len() as f64 * ROW_HEIGHT;
        let width = (viewport_width - 2.0 * x).max(1.0);
        boxes.push((el, BoundingBox::new(x, y, width, BOX_HEIGHT)));
    }
    boxes
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sim() -> BankSimulator {
        BankSimulator::new(&SuiteConfig::default())
    }

    fn css(s: &str) -> Selector {
        Selector::css(s)
    }

    async fn open(sim: &BankSimulator, fragment: &str) {
        let url = format!("{}{fragment}", DEFAULT_BASE);
        sim.navigate(&url).await.unwrap();
    }

    const DEFAULT_BASE: &str = crate::config::DEFAULT_BASE_URL;

    async fn login_hermoine(sim: &BankSimulator) {
        open(sim, "#/customer").await;
        sim.select_option(&css("#userSelect"), "Hermoine Granger").await.unwrap();
        sim.click(&css(r#"button[type="submit"]"#)).await.unwrap();
    }

    async fn text(sim: &BankSimulator, s: &str) -> String {
        sim.text_content(&css(s)).await.unwrap().unwrap_or_default()
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_starts_blank() {
            let sim = sim();
            assert_eq!(sim.current_url().await.unwrap(), "about:blank");
            assert_eq!(sim.count(&css("body")).await.unwrap(), 1);
            assert!(!sim.is_visible(&css("body")).await.unwrap());
        }

        #[tokio::test]
        async fn test_root_redirects_to_login() {
            let sim = sim();
            sim.navigate(DEFAULT_BASE).await.unwrap();
            assert!(sim.current_url().await.unwrap().ends_with("/#/login"));
            assert!(sim.is_visible(&css(r#"button[ng-click="manager()"]"#)).await.unwrap());
        }

        #[tokio::test]
        async fn test_network_idle_after_busy_polls() {
            let sim = sim();
            open(&sim, "#/login").await;
            assert!(sim.load_state_reached(LoadState::DomContentLoaded).await.unwrap());
            assert!(!sim.load_state_reached(LoadState::NetworkIdle).await.unwrap());
            assert!(!sim.load_state_reached(LoadState::NetworkIdle).await.unwrap());
            assert!(sim.load_state_reached(LoadState::NetworkIdle).await.unwrap());
        }

        #[tokio::test]
        async fn test_foreign_host_fails() {
            let err = sim().navigate("https://example.invalid/").await.unwrap_err();
            assert!(matches!(err, TellerError::Navigation { .. }));
        }

        #[tokio::test]
        async fn test_account_without_login_redirects() {
            let sim = sim();
            open(&sim, "#/account").await;
            assert!(sim.current_url().await.unwrap().ends_with("#/customer"));
        }
    }

    mod customer_tests {
        use super::*;

        #[tokio::test]
        async fn test_login_button_hidden_until_selection() {
            let sim = sim();
            open(&sim, "#/customer").await;
            let login = css(r#"button[type="submit"]"#);
            assert!(!sim.is_visible(&login).await.unwrap());
            let err = sim.click(&login).await.unwrap_err();
            assert!(matches!(err, TellerError::LocatorResolution { .. }));

            sim.select_option(&css("#userSelect"), "Harry Potter").await.unwrap();
            assert!(sim.is_visible(&login).await.unwrap());
        }

        #[tokio::test]
        async fn test_login_shows_first_account() {
            let sim = sim();
            login_hermoine(&sim).await;
            assert_eq!(text(&sim, ".fontBig").await, "Hermoine Granger");
            assert_eq!(text(&sim, ".center strong.ng-binding:nth-of-type(1)").await, "1001");
            assert_eq!(text(&sim, ".center strong.ng-binding:nth-of-type(2)").await, "5096");
            assert_eq!(text(&sim, ".center strong.ng-binding:nth-of-type(3)").await, "Dollar");
        }

        #[tokio::test]
        async fn test_unknown_option_label() {
            let sim = sim();
            open(&sim, "#/customer").await;
            let err = sim.select_option(&css("#userSelect"), "Nobody").await.unwrap_err();
            assert!(matches!(err, TellerError::LocatorResolution { .. }));
        }

        #[tokio::test]
        async fn test_deposit_then_insufficient_withdrawal() {
            let sim = sim();
            login_hermoine(&sim).await;
            sim.click(&css(r#"button[ng-click="deposit()"]"#)).await.unwrap();
            sim.fill(&css(r#"input[ng-model="amount"]"#), "100").await.unwrap();
            sim.click(&Selector::css_with_text(r#"button[type="submit"]"#, "Deposit"))
                .await
                .unwrap();
            assert_eq!(text(&sim, r#"span[ng-show="message"]"#).await, "Deposit Successful");
            assert_eq!(sim.input_value(&css(r#"input[ng-model="amount"]"#)).await.unwrap(), "");
            assert_eq!(text(&sim, ".center strong.ng-binding:nth-of-type(2)").await, "5196");

            sim.click(&css(r#"button[ng-click="withdrawl()"]"#)).await.unwrap();
            sim.fill(&css(r#"input[ng-model="amount"]"#), "6000").await.unwrap();
            sim.click(&Selector::css_with_text(r#"button[type="submit"]"#, "Withdraw"))
                .await
                .unwrap();
            assert_eq!(text(&sim, r#"[ng-show="message"]"#).await, messages::INSUFFICIENT_FUNDS);
            assert_eq!(text(&sim, ".center strong.ng-binding:nth-of-type(2)").await, "5196");
        }

        #[tokio::test]
        async fn test_amount_beyond_i64_posts_nothing() {
            let sim = sim();
            login_hermoine(&sim).await;
            sim.click(&css(r#"button[ng-click="deposit()"]"#)).await.unwrap();
            let amount = css(r#"input[ng-model="amount"]"#);
            let deposit = Selector::css_with_text(r#"button[type="submit"]"#, "Deposit");
            sim.fill(&amount, "100000000000000000000").await.unwrap();
            sim.click(&deposit).await.unwrap();

            assert_eq!(text(&sim, r#"span[ng-show="message"]"#).await, "");
            assert_eq!(sim.input_value(&amount).await.unwrap(), "");
            assert_eq!(text(&sim, ".center strong.ng-binding:nth-of-type(2)").await, "5096");

            sim.fill(&amount, "10").await.unwrap();
            sim.click(&deposit).await.unwrap();
            assert_eq!(text(&sim, r#"span[ng-show="message"]"#).await, "Deposit Successful");
            assert_eq!(text(&sim, ".center strong.ng-binding:nth-of-type(2)").await, "5106");
        }

        #[test]
        fn test_post_refuses_balance_overflow() {
            let mut bank = Bank::seeded();
            let at = Local::now().naive_local();
            assert!(!bank.post(1001, i64::MAX, TransactionType::Credit, at));
            assert!(bank.post(1002, i64::MAX, TransactionType::Credit, at));
            assert!(!bank.post(1002, 1, TransactionType::Credit, at));
            assert_eq!(bank.accounts[&1002].balance, i64::MAX);
            assert_eq!(bank.accounts[&1002].transactions.len(), 1);
        }

        #[tokio::test]
        async fn test_message_red_and_above_label() {
            let sim = sim();
            login_hermoine(&sim).await;
            sim.click(&css(r#"button[ng-click="deposit()"]"#)).await.unwrap();
            sim.fill(&css(r#"input[ng-model="amount"]"#), "5").await.unwrap();
            sim.click(&Selector::css_with_text(r#"button[type="submit"]"#, "Deposit"))
                .await
                .unwrap();
            let message = css(r#"span[ng-show="message"]"#);
            assert_eq!(sim.computed_style(&message, "color").await.unwrap(), "rgb(255, 0, 0)");
            let label = Selector::css_with_text("label", "Amount to be Deposited");
            let message_box = sim.bounding_box(&message).await.unwrap().unwrap();
            let label_box = sim.bounding_box(&label).await.unwrap().unwrap();
            assert!(message_box.is_above(&label_box));
        }

        #[tokio::test]
        async fn test_number_field_validation_blocks_submit() {
            let sim = sim();
            login_hermoine(&sim).await;
            sim.click(&css(r#"button[ng-click="deposit()"]"#)).await.unwrap();
            let amount = css(r#"input[ng-model="amount"]"#);
            assert_eq!(
                sim.validation_message(&amount).await.unwrap(),
                "Please fill out this field."
            );
            sim.fill(&amount, "123.45").await.unwrap();
            sim.click(&Selector::css_with_text(r#"button[type="submit"]"#, "Deposit"))
                .await
                .unwrap();
            assert_eq!(
                sim.validation_message(&amount).await.unwrap(),
                "Please enter a valid value. The two nearest valid values are 123 and 124."
            );
            assert_eq!(text(&sim, r#"span[ng-show="message"]"#).await, "");
            assert!(sim.fill(&amount, "abc").await.is_err());
        }

        #[tokio::test]
        async fn test_firefox_number_wording() {
            let config = SuiteConfig::default().with_engine(BrowserEngine::Firefox);
            let sim = BankSimulator::new(&config);
            login_hermoine(&sim).await;
            sim.click(&css(r#"button[ng-click="withdrawl()"]"#)).await.unwrap();
            assert_eq!(
                sim.validation_message(&css(r#"input[ng-model="amount"]"#)).await.unwrap(),
                "Please enter a number."
            );
        }

        #[tokio::test]
        async fn test_transactions_sort_reset_and_filter() {
            let sim = sim();
            login_hermoine(&sim).await;
            sim.click(&css(r#"button[ng-click="transactions()"]"#)).await.unwrap();
            let rows = css("table.table tbody tr");
            let first_amount = css("table.table tbody tr td:nth-child(2)");
            assert_eq!(sim.count(&rows).await.unwrap(), 3);
            assert_eq!(text(&sim, "table.table tbody tr td:nth-child(2)").await, "5000");

            sim.click(&Selector::css_with_text("a", "Date-Time")).await.unwrap();
            assert_eq!(sim.text_content(&first_amount).await.unwrap().unwrap(), "904");

            sim.fill(&css("#start"), "2015-01-02T00:00").await.unwrap();
            sim.fill(&css("#end"), "2015-01-03T00:00").await.unwrap();
            assert_eq!(sim.count(&rows).await.unwrap(), 1);
            assert!(sim.fill(&css("#start"), "yesterday").await.is_err());

            sim.click(&css(r#"button[ng-click="reset()"]"#)).await.unwrap();
            assert_eq!(sim.count(&rows).await.unwrap(), 0);
        }
    }

    mod manager_tests {
        use super::*;

        async fn fill_customer(sim: &BankSimulator, first: &str, last: &str, post: &str) {
            open(sim, "#/manager/addCust").await;
            sim.fill(&css(r#"input[ng-model="fName"]"#), first).await.unwrap();
            sim.fill(&css(r#"input[ng-model="lName"]"#), last).await.unwrap();
            sim.fill(&css(r#"input[ng-model="postCd"]"#), post).await.unwrap();
        }

        fn submit(label: &str) -> Selector {
            Selector::css_with_text(r#"button[type="submit"]"#, label)
        }

        /// Click a submit that raises an alert and accept it from a second
        /// future while the click is still blocked
        async fn submit_and_accept(sim: &BankSimulator, label: &str) -> Dialog {
            let mut events = sim.subscribe_dialogs();
            let answer = async {
                let dialog = events.recv().await.unwrap();
                assert!(sim.has_open_dialog());
                assert!(sim.count(&css("body")).await.is_err());
                sim.accept_dialog(None).await.unwrap();
                dialog
            };
            let target = submit(label);
            let (clicked, dialog) = tokio::join!(sim.click(&target), answer);
            clicked.unwrap();
            dialog
        }

        #[tokio::test]
        async fn test_add_customer_raises_alert_and_blocks_page() {
            let sim = sim();
            fill_customer(&sim, "Luna", "Lovegood", "E1 1AA").await;
            let dialog = submit_and_accept(&sim, "Add Customer").await;
            assert_eq!(dialog.message(), "Customer added successfully with customer id :6");

            assert!(!sim.has_open_dialog());
            assert!(sim.accept_dialog(None).await.is_err());
            open(&sim, "#/manager/list").await;
            assert_eq!(sim.count(&css("table.table tbody tr")).await.unwrap(), 6);
        }

        #[tokio::test]
        async fn test_unanswered_alert_times_out_the_click() {
            let config = SuiteConfig {
                action_timeout_ms: 100,
                ..SuiteConfig::default()
            };
            let sim = BankSimulator::new(&config);
            fill_customer(&sim, "No", "Arm", "E1").await;

            let err = sim.click(&submit("Add Customer")).await.unwrap_err();
            assert!(err.is_timeout(), "unexpected error: {err}");
            assert!(sim.has_open_dialog());
            assert!(sim.count(&css("body")).await.is_err());

            sim.accept_dialog(None).await.unwrap();
            assert_eq!(sim.count(&css("body")).await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_duplicate_customer() {
            let sim = sim();
            fill_customer(&sim, "Harry", "Potter", "E725JB").await;
            let dialog = submit_and_accept(&sim, "Add Customer").await;
            assert_eq!(dialog.message(), messages::DUPLICATE_CUSTOMER);
        }

        #[tokio::test]
        async fn test_required_fields_block_submit() {
            let sim = sim();
            fill_customer(&sim, "", "Lovegood", "E1 1AA").await;
            sim.click(&submit("Add Customer")).await.unwrap();
            assert!(!sim.has_open_dialog());
            assert_eq!(
                sim.validation_message(&css(r#"input[ng-model="fName"]"#)).await.unwrap(),
                "Please fill out this field."
            );
        }

        #[tokio::test]
        async fn test_open_account_numbers_increase() {
            let sim = sim();
            for expected in [1016, 1017] {
                open(&sim, "#/manager/openAccount").await;
                sim.select_option(&css("#userSelect"), "Albus Dumbledore").await.unwrap();
                sim.select_option(&css("#currency"), "Pound").await.unwrap();
                let dialog = submit_and_accept(&sim, "Process").await;
                assert_eq!(dialog.trailing_number(), Some(expected));
            }
        }

        #[tokio::test]
        async fn test_search_and_delete() {
            let sim = sim();
            open(&sim, "#/manager/list").await;
            let rows = css("table.table tbody tr");
            sim.fill(&css(r#"input[ng-model="searchCustomer"]"#), "ron").await.unwrap();
            assert_eq!(sim.count(&rows).await.unwrap(), 1);

            sim.fill(&css(r#"input[ng-model="searchCustomer"]"#), "").await.unwrap();
            sim.click(&css(r#"button[ng-click="deleteCust(cust)"]"#)).await.unwrap();
            assert_eq!(sim.count(&rows).await.unwrap(), 4);
            assert_eq!(text(&sim, "table.table tbody tr td").await, "Harry");
        }

        #[tokio::test]
        async fn test_select_placeholder_wording() {
            let sim = sim();
            open(&sim, "#/manager/openAccount").await;
            assert_eq!(
                sim.validation_message(&css("#currency")).await.unwrap(),
                "Please select an item in the list."
            );
        }
    }

    mod screenshot_tests {
        use super::*;

        #[tokio::test]
        async fn test_screenshot_is_png_of_viewport() {
            let config = SuiteConfig {
                viewport_width: 320,
                viewport_height: 200,
                ..SuiteConfig::default()
            };
            let sim = BankSimulator::new(&config);
            open(&sim, "#/login").await;
            let shot = sim.screenshot().await.unwrap();
            assert!(shot.is_png());
            let img = image::load_from_memory(&shot.data).unwrap();
            assert_eq!((img.width(), img.height()), (320, 200));
        }
    }
}
