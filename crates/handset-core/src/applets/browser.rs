//! Web browser: address bar plus back/forward history.
//!
//! Pages render in an external frame; this applet only tracks which URL
//! the frame should show.

use crate::applets::{Applet, AppletContext, arg, rest, unknown_command};
use crate::error::{HandsetError, Result};
use crate::registry::AppId;

/// Shortcuts shown on the start page.
const QUICK_LINKS: [(&str, &str); 4] = [
    ("Google", "https://www.google.com/search?igu=1"),
    ("Meta Mirror", "https://meta-mirror.vercel.app"),
    ("NeoMoji", "https://neomoji-beta.netlify.app"),
    ("NES", "https://tyson.JesseJesse.com"),
];

/// Turn address bar input into a URL.
///
/// Input with no dot, or with a space, is a search. Anything else gets
/// `https://` unless it already names `http` or `https`. Blank input
/// yields `None`.
pub fn normalize_address(input: &str, search_url: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if !input.contains('.') || input.contains(' ') {
        return Some(search_url.replace("{}", &encode_component(input)));
    }
    if input.starts_with("http://") || input.starts_with("https://") {
        return Some(input.to_string());
    }
    Some(format!("https://{input}"))
}

/// Percent-encode everything outside the URI component unreserved set.
fn encode_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(char::from(byte)),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

pub struct BrowserApplet {
    home_url: String,
    search_url: String,
    back_stack: Vec<String>,
    forward_stack: Vec<String>,
    /// `None` shows the start page.
    current: Option<String>,
    reloads: u32,
}

impl BrowserApplet {
    pub fn new(home_url: &str, search_url: &str) -> Self {
        Self {
            home_url: home_url.to_string(),
            search_url: search_url.to_string(),
            back_stack: Vec::new(),
            forward_stack: Vec::new(),
            current: None,
            reloads: 0,
        }
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn can_go_back(&self) -> bool {
        !self.back_stack.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward_stack.is_empty()
    }

    /// Load address bar input. Pushes the current page to the back stack
    /// and clears the forward stack.
    pub fn load(&mut self, input: &str) -> Result<()> {
        let url = normalize_address(input, &self.search_url)
            .ok_or_else(|| HandsetError::Validation("enter a URL or search".into()))?;
        self.navigate(url);
        Ok(())
    }

    fn navigate(&mut self, url: String) {
        if let Some(prev) = self.current.take() {
            self.back_stack.push(prev);
        }
        self.forward_stack.clear();
        log::debug!("Browser loading {url}");
        self.current = Some(url);
        self.reloads = 0;
    }

    pub fn go_back(&mut self) -> Option<&str> {
        let prev = self.back_stack.pop()?;
        if let Some(current) = self.current.take() {
            self.forward_stack.push(current);
        }
        self.current = Some(prev);
        self.current.as_deref()
    }

    pub fn go_forward(&mut self) -> Option<&str> {
        let next = self.forward_stack.pop()?;
        if let Some(current) = self.current.take() {
            self.back_stack.push(current);
        }
        self.current = Some(next);
        self.current.as_deref()
    }

    /// Navigate to the configured home page.
    pub fn go_home(&mut self) {
        let url = self.home_url.clone();
        self.navigate(url);
    }

    /// Leave the page for the start page. History is kept.
    pub fn start_page(&mut self) {
        if let Some(current) = self.current.take() {
            self.back_stack.push(current);
        }
        self.forward_stack.clear();
    }

    /// Every URL visited, most recent first.
    pub fn history(&self) -> Vec<&str> {
        self.current
            .iter()
            .chain(self.back_stack.iter().rev())
            .map(String::as_str)
            .collect()
    }
}

impl Applet for BrowserApplet {
    fn id(&self) -> AppId {
        AppId::Browser
    }

    fn handle(&mut self, command: &str, args: &[&str], _cx: &mut AppletContext<'_>) -> Result<()> {
        match command {
            "go" | "open" => self.load(&rest(args))?,
            "back" => {
                self.go_back();
            },
            "forward" => {
                self.go_forward();
            },
            "home" => self.go_home(),
            "start" => self.start_page(),
            "reload" => {
                if self.current.is_some() {
                    self.reloads += 1;
                }
            },
            "link" => {
                let n: usize = arg(args, 0, "link number")?;
                let (_, url) = n
                    .checked_sub(1)
                    .and_then(|i| QUICK_LINKS.get(i))
                    .ok_or_else(|| HandsetError::Validation(format!("no quick link {n}")))?;
                self.navigate((*url).to_string());
            },
            other => return Err(unknown_command(self.id(), other)),
        }
        Ok(())
    }

    fn view(&self) -> Vec<String> {
        let back = if self.can_go_back() { "<" } else { " " };
        let forward = if self.can_go_forward() { ">" } else { " " };
        let mut lines = vec![format!(
            "[home] [{back}] [{forward}] [reload]  {}",
            self.current.as_deref().unwrap_or("search or enter website URL")
        )];
        match &self.current {
            Some(url) if self.reloads > 0 => {
                lines.push(format!("[ {url} ] (reloaded {}x)", self.reloads));
            },
            Some(url) => lines.push(format!("[ {url} ]")),
            None => {
                lines.push("Quick Links".into());
                lines.extend(
                    QUICK_LINKS
                        .iter()
                        .enumerate()
                        .map(|(i, (name, _))| format!("{}. {name}", i + 1)),
                );
            },
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applets::test_support::Harness;

    const SEARCH: &str = "https://www.google.com/search?q={}";

    fn browser() -> BrowserApplet {
        BrowserApplet::new("https://www.google.com", SEARCH)
    }

    #[test]
    fn address_normalisation() {
        assert_eq!(
            normalize_address("example.com", SEARCH).as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            normalize_address("http://example.com", SEARCH).as_deref(),
            Some("http://example.com")
        );
        assert_eq!(
            normalize_address("rust lang", SEARCH).as_deref(),
            Some("https://www.google.com/search?q=rust%20lang")
        );
        assert_eq!(
            normalize_address("weather", SEARCH).as_deref(),
            Some("https://www.google.com/search?q=weather")
        );
        assert_eq!(normalize_address("   ", SEARCH), None);
    }

    #[test]
    fn search_terms_are_encoded() {
        assert_eq!(
            normalize_address("a&b=c", SEARCH).as_deref(),
            Some("https://www.google.com/search?q=a%26b%3Dc")
        );
    }

    #[test]
    fn back_and_forward() {
        let mut b = browser();
        b.load("a.com").unwrap();
        b.load("b.com").unwrap();
        assert!(b.can_go_back());
        assert_eq!(b.go_back(), Some("https://a.com"));
        assert!(b.can_go_forward());
        assert_eq!(b.go_forward(), Some("https://b.com"));
        assert!(!b.can_go_forward());
    }

    #[test]
    fn new_load_clears_forward() {
        let mut b = browser();
        b.load("a.com").unwrap();
        b.load("b.com").unwrap();
        b.go_back();
        b.load("c.com").unwrap();
        assert!(!b.can_go_forward());
        assert_eq!(b.history(), ["https://c.com", "https://a.com"]);
    }

    #[test]
    fn home_and_start_page() {
        let mut b = browser();
        b.load("a.com").unwrap();
        b.go_home();
        assert_eq!(b.current_url(), Some("https://www.google.com"));
        b.start_page();
        assert_eq!(b.current_url(), None);
        assert_eq!(b.go_back(), Some("https://www.google.com"));
    }

    #[test]
    fn commands() {
        let mut h = Harness::new();
        let mut b = browser();
        h.run(&mut b, "go example.com").unwrap();
        h.run(&mut b, "link 3").unwrap();
        assert_eq!(b.current_url(), Some("https://neomoji-beta.netlify.app"));
        h.run(&mut b, "back").unwrap();
        assert_eq!(b.current_url(), Some("https://example.com"));
        assert!(h.run(&mut b, "go").unwrap_err().is_validation());
        assert!(h.run(&mut b, "link 9").unwrap_err().is_validation());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn arb_hosts(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
            proptest::collection::vec("[a-z]{3,10}".prop_map(|s| format!("{s}.com")), min..max)
        }

        proptest! {
            #[test]
            fn back_all_the_way_reaches_first(hosts in arb_hosts(1, 20)) {
                let mut b = browser();
                for host in &hosts {
                    b.load(host).unwrap();
                }
                let mut steps = 0;
                while b.can_go_back() {
                    b.go_back();
                    steps += 1;
                }
                prop_assert_eq!(steps, hosts.len() - 1);
                let first = format!("https://{}", hosts[0]);
                prop_assert_eq!(b.current_url(), Some(first.as_str()));
            }

            #[test]
            fn back_then_forward_is_identity(hosts in arb_hosts(2, 10)) {
                let mut b = browser();
                for host in &hosts {
                    b.load(host).unwrap();
                }
                let before = b.current_url().map(str::to_string);
                b.go_back();
                b.go_forward();
                prop_assert_eq!(b.current_url().map(str::to_string), before);
            }

            #[test]
            fn normalized_address_is_http(input in "[ -~]{1,40}") {
                if let Some(url) = normalize_address(&input, SEARCH) {
                    prop_assert!(url.starts_with("http://") || url.starts_with("https://"));
                }
            }
        }
    }
}
