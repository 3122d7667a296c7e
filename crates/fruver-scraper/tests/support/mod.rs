//! A scripted in-memory [`Browser`] for driving strategies without a real
//! WebDriver session.
//!
//! A test describes the shop as a list of [`Scene`]s, one per page state.
//! Clicking a next or reveal control moves to the following scene, and
//! selecting a dropdown value jumps to the scene tagged with that value.
//! Every action is appended to a log the test can inspect.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use fruver_core::{FieldLocators, Locator};
use fruver_scraper::{Action, Browser, DriverError, Wait};

pub const CARD: &str = ".product-card";
pub const NAME: &str = ".name";
pub const PRICE: &str = ".price";
pub const UNIT: &str = ".unit";
pub const NEXT: &str = "a.next";
pub const MORE: &str = "button.show-more";
pub const OVERLAY_CLOSE: &str = "#overlay-close";
pub const SELECT: &str = "select.pages";

#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Plain,
    /// Moves to the next scene; intercepted while the overlay is open.
    Advance,
    OverlayClose,
    Select(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub text: String,
    pub role: Role,
    pub children: HashMap<String, Vec<Node>>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Node {
    pub fn new(id: &str, text: &str) -> Self {
        Self {
            id: id.to_owned(),
            text: text.to_owned(),
            role: Role::Plain,
            children: HashMap::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_child(mut self, selector: &str, child: Node) -> Self {
        self.children
            .entry(selector.to_owned())
            .or_default()
            .push(child);
        self
    }
}

/// A product card with name, price and optional unit price children.
pub fn card(name: &str, price: &str, unit: Option<&str>) -> Node {
    let mut node = Node::new(&format!("card:{name}"), "")
        .with_child(NAME, Node::new(&format!("name:{name}"), name))
        .with_child(PRICE, Node::new(&format!("price:{name}"), price));
    if let Some(unit) = unit {
        node = node.with_child(UNIT, Node::new(&format!("unit:{name}"), unit));
    }
    node
}

pub fn advance_control(selector: &str) -> Node {
    Node::new(selector, "siguiente").with_role(Role::Advance)
}

pub fn fields() -> FieldLocators {
    FieldLocators {
        name: Locator::css(NAME),
        price: Locator::css(PRICE),
        unit_price: Some(Locator::css(UNIT)),
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub url: String,
    /// Dropdown value that leads to this scene.
    pub select_value: Option<String>,
    pub elements: HashMap<String, Vec<Node>>,
}

impl Scene {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            ..Self::default()
        }
    }

    pub fn selected_by(mut self, value: &str) -> Self {
        self.select_value = Some(value.to_owned());
        self
    }

    pub fn with(mut self, selector: &str, node: Node) -> Self {
        self.elements
            .entry(selector.to_owned())
            .or_default()
            .push(node);
        self
    }

    pub fn with_cards(self, cards: Vec<Node>) -> Self {
        cards.into_iter().fold(self, |scene, c| scene.with(CARD, c))
    }
}

#[derive(Debug, Default)]
struct State {
    scenes: Vec<Scene>,
    current: usize,
    overlay_open: bool,
    intercepts: u32,
    failing_advance_clicks: u32,
    failing_scenes: HashSet<usize>,
    actions: Vec<String>,
}

pub struct ScriptedBrowser {
    state: Mutex<State>,
}

impl ScriptedBrowser {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self {
            state: Mutex::new(State {
                scenes,
                ..State::default()
            }),
        }
    }

    /// Open an overlay that intercepts the next `intercepts` advance clicks
    /// until it is closed.
    pub fn with_overlay(self, intercepts: u32) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.overlay_open = true;
            state.intercepts = intercepts;
        }
        self
    }

    /// Make the next `count` advance clicks fail with a session error.
    pub fn failing_advance_clicks(self, count: u32) -> Self {
        self.state.lock().unwrap().failing_advance_clicks = count;
        self
    }

    /// Make every element lookup fail while on scene `index`.
    pub fn failing_scene(self, index: usize) -> Self {
        self.state.lock().unwrap().failing_scenes.insert(index);
        self
    }

    pub fn actions(&self) -> Vec<String> {
        self.state.lock().unwrap().actions.clone()
    }

    pub fn current_scene(&self) -> usize {
        self.state.lock().unwrap().current
    }

    pub fn overlay_open(&self) -> bool {
        self.state.lock().unwrap().overlay_open
    }

    fn click(&self, node: &Node, scripted: bool) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        match node.role {
            Role::Advance => {
                if state.failing_advance_clicks > 0 {
                    state.failing_advance_clicks -= 1;
                    return Err(DriverError::Session("connection reset".to_owned()));
                }
                if !scripted && state.overlay_open && state.intercepts > 0 {
                    state.intercepts -= 1;
                    state.actions.push(format!("intercepted:{}", node.id));
                    return Err(DriverError::ClickIntercepted);
                }
                state.current = (state.current + 1).min(state.scenes.len() - 1);
            }
            Role::OverlayClose => state.overlay_open = false,
            Role::Plain | Role::Select(_) => {}
        }
        state.actions.push(format!("click:{}", node.id));
        Ok(())
    }
}

impl Browser for ScriptedBrowser {
    type Element = Node;

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.state.lock().unwrap().actions.push(format!("goto:{url}"));
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let state = self.state.lock().unwrap();
        Ok(state.scenes[state.current].url.clone())
    }

    async fn find_all(
        &self,
        scope: Option<&Node>,
        locator: &Locator,
        _wait: Wait,
    ) -> Result<Vec<Node>, DriverError> {
        let state = self.state.lock().unwrap();
        if state.failing_scenes.contains(&state.current) {
            return Err(DriverError::Session("browser went away".to_owned()));
        }
        let found = match scope {
            Some(node) => node.children.get(locator.expression()).cloned(),
            None => state.scenes[state.current]
                .elements
                .get(locator.expression())
                .cloned(),
        };
        Ok(found
            .unwrap_or_default()
            .into_iter()
            .filter(|n| n.role != Role::OverlayClose || state.overlay_open)
            .collect())
    }

    async fn text(&self, element: &Node) -> Result<String, DriverError> {
        Ok(element.text.clone())
    }

    async fn attr(&self, element: &Node, name: &str) -> Result<Option<String>, DriverError> {
        Ok((name == "id").then(|| element.id.clone()))
    }

    async fn option_values(&self, select: &Node) -> Result<Vec<String>, DriverError> {
        match &select.role {
            Role::Select(options) => Ok(options.clone()),
            _ => Ok(Vec::new()),
        }
    }

    async fn page_height(&self) -> Result<f64, DriverError> {
        Ok(2_000.0)
    }

    async fn act(&self, action: Action<'_, Node>) -> Result<(), DriverError> {
        match action {
            Action::Click(node) => self.click(node, false),
            Action::ScriptClick(node) => self.click(node, true),
            Action::ScrollIntoView(_) | Action::ScrollTo(_) | Action::ScrollToBottom => Ok(()),
            Action::SelectValue(_, value) => {
                let mut state = self.state.lock().unwrap();
                if let Some(index) = state
                    .scenes
                    .iter()
                    .position(|s| s.select_value.as_deref() == Some(value))
                {
                    state.current = index;
                }
                state.actions.push(format!("select:{value}"));
                Ok(())
            }
        }
    }

    async fn close(self) -> Result<(), DriverError> {
        Ok(())
    }
}
