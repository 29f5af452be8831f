//! HTML snippet that embeds the chat widget in a third-party page.

use crate::constants::embed;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Right,
    Left,
    Center,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Right => "right",
            Position::Left => "left",
            Position::Center => "center",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedOptions {
    pub position: Position,
    pub theme: Theme,
    pub initially_open: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Fresh element id, e.g. `deepchat-widget-3f9a0c1be`.
pub fn unique_element_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", embed::ELEMENT_ID_PREFIX, &random[..9])
}

/// Render the embed snippet. `script_url` is the origin serving the widget bundle.
pub fn generate_embed_code(options: &EmbedOptions, script_url: &str) -> String {
    let id = unique_element_id();
    let width = options.width.unwrap_or(embed::DEFAULT_WIDTH);
    let height = options.height.unwrap_or(embed::DEFAULT_HEIGHT);
    let script_url = script_url.trim_end_matches('/');

    format!(
        r#"<!-- DeepChat Widget -->
<div id="{id}"></div>
<script>
(function() {{
  const script = document.createElement('script');
  script.type = 'text/javascript';
  script.async = true;
  script.src = '{script_url}/{script_file}';
  script.onload = function() {{
    {global}.init('{id}', {{
      position: '{position}',
      theme: '{theme}',
      initiallyOpen: {open},
      width: {width},
      height: {height}
    }});
  }};
  document.head.appendChild(script);
}})();
</script>
<!-- End DeepChat Widget -->"#,
        script_file = embed::SCRIPT_FILE,
        global = embed::GLOBAL_NAME,
        position = options.position,
        theme = options.theme,
        open = options.initially_open,
    )
}
