//! The default playlist, used when the config file does not provide one.
//!
//! Urls are resolved against `audio.media_root`.

pub(super) const BUILTIN_PLAYLIST: &str = r#"
[[track]]
title = "In My Feelings"
artist = "Drake"
album = "Scorpion"
year = "2018"
url = "/in-my-feelings.mp3"
image = "/in-my-feelings.jpeg"

[[track]]
title = "Let It All Work Out"
artist = "Lil Wayne"
album = "Tha Carter V"
year = "2018"
url = "/let-it-all-work-out.mp3"
image = "/let-it-all-work-out.jpg"

[[track]]
title = "Stories About My Brother"
artist = "Drake"
album = "For All the Dogs"
year = "2023"
url = "/stories-about-my-brother.mp3"
image = "/stories-about-my-brother.jpg"
"#;
