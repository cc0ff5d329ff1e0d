//! Constants for the `stackpane` application.

use nu_ansi_term::Color;
use std::time::Duration;

/// File name of the panel configuration, relative to the `.git` directory.
pub(crate) const CONFIG_FILE_NAME: &str = ".stackpane.toml";

/// Number of characters kept when shortening a commit SHA for display.
pub(crate) const SHORT_SHA_LEN: usize = 8;

/// Number of commit rows revealed per "show more" step.
pub(crate) const COMMIT_PAGE_SIZE: usize = 10;

/// Time an entering card keeps its enter mark before settling.
pub(crate) const ENTER_ANIM: Duration = Duration::from_millis(300);

/// Time an exiting card lingers before it is swept out of the tree.
pub(crate) const EXIT_ANIM: Duration = Duration::from_millis(200);

/// Time a changed field keeps its flash mark.
pub(crate) const FLASH_ANIM: Duration = Duration::from_millis(600);

/// Upper bound on a single external tool invocation.
pub(crate) const TOOL_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const CURRENT_COLOR: Color = Color::Green;
pub(crate) const BRANCH_COLOR: Color = Color::Blue;
pub(crate) const RESTACK_COLOR: Color = Color::Yellow;
pub(crate) const CHANGE_COLOR: Color = Color::Cyan;
pub(crate) const SHA_COLOR: Color = Color::Purple;
pub(crate) const ERROR_COLOR: Color = Color::Red;

pub(crate) const FILLED_CIRCLE: char = '●';
pub(crate) const EMPTY_CIRCLE: char = '○';
pub(crate) const VERTICAL_BOX: char = '│';
pub(crate) const BOTTOM_LEFT_BOX: char = '└';
