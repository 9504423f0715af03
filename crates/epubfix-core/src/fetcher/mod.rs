//! Image fetcher: download, decode, re-encode and store one remote image.
//!
//! Each URL gets up to `RetryPolicy::max_attempts` attempts with a constant
//! backoff in between. Any failure counts (transport, HTTP status, decode,
//! write). Filenames claimed during a run are remembered so a second image
//! with the same basename never overwrites the first.

pub(crate) mod encode;
mod error;
mod source;

pub use error::FetchError;
pub use source::{CurlSource, ImageSource};

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::retry::{run_with_retry_sleeping, RetryPolicy};
use crate::url_model::{derive_image_filename, with_suffix};

/// Downloads placeholder images into an images directory.
pub struct ImageFetcher<S> {
    source: S,
    policy: RetryPolicy,
    sleep: Box<dyn FnMut(Duration)>,
    /// Filename → URL that produced it, for this run.
    claimed: HashMap<String, String>,
    /// URL → filename, so repeated placeholders reuse one download.
    by_url: HashMap<String, String>,
}

impl<S: ImageSource> ImageFetcher<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self {
            source,
            policy,
            sleep: Box::new(std::thread::sleep),
            claimed: HashMap::new(),
            by_url: HashMap::new(),
        }
    }

    /// Replace the backoff sleep (tests count delays instead of waiting).
    pub fn with_sleeper(mut self, sleep: impl FnMut(Duration) + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    /// Fetches `url` into `images_dir` and returns the stored filename, or `None`
    /// once every attempt has failed.
    pub fn fetch(&mut self, url: &str, images_dir: &Path) -> Option<String> {
        if let Some(name) = self.by_url.get(url) {
            if images_dir.join(name).is_file() {
                tracing::debug!("reusing {} for {}", name, url);
                return Some(name.clone());
            }
        }

        let name = self.free_name(url, images_dir);
        let path = images_dir.join(&name);
        let max_attempts = self.policy.max_attempts;

        let source = &self.source;
        let sleep = &mut self.sleep;
        let result = run_with_retry_sleeping(
            &self.policy,
            |d| (*sleep)(d),
            |attempt| {
                let outcome = source
                    .fetch(url)
                    .and_then(|bytes| encode::reencode_to(&bytes, &path));
                if let Err(e) = &outcome {
                    tracing::warn!(
                        "image download failed (attempt {}/{}) {} -> {}",
                        attempt,
                        max_attempts,
                        url,
                        e
                    );
                }
                outcome
            },
        );

        match result {
            Ok(()) => {
                tracing::info!("stored {} as {}", url, name);
                self.claimed.insert(name.clone(), url.to_string());
                self.by_url.insert(url.to_string(), name.clone());
                Some(name)
            }
            Err(e) => {
                tracing::warn!("giving up on {}: {}", url, e);
                None
            }
        }
    }

    /// Derived filename, suffixed until it is neither claimed by another URL
    /// nor already present on disk.
    fn free_name(&self, url: &str, images_dir: &Path) -> String {
        let base = derive_image_filename(url);
        let taken = |name: &str| match self.claimed.get(name) {
            Some(owner) => owner != url,
            None => images_dir.join(name).exists(),
        };
        if !taken(&base) {
            return base;
        }
        let mut n = 1u32;
        loop {
            let candidate = with_suffix(&base, n);
            if !taken(&candidate) {
                tracing::debug!("{} already taken, using {}", base, candidate);
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::encode::tests::png_bytes;
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Serves a fixed script of responses, one per call, then repeats the last.
    struct ScriptedSource {
        script: RefCell<Vec<Result<Vec<u8>, u32>>>,
        calls: Cell<u32>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Vec<u8>, u32>>) -> Self {
            Self {
                script: RefCell::new(script),
                calls: Cell::new(0),
            }
        }
    }

    impl ImageSource for ScriptedSource {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.set(self.calls.get() + 1);
            let mut script = self.script.borrow_mut();
            let next = if script.len() > 1 {
                script.remove(0)
            } else {
                script[0].clone()
            };
            next.map_err(FetchError::Http)
        }
    }

    fn counting_fetcher(source: ScriptedSource) -> (ImageFetcher<ScriptedSource>, Rc<Cell<u32>>) {
        let sleeps = Rc::new(Cell::new(0));
        let counter = Rc::clone(&sleeps);
        let fetcher = ImageFetcher::new(source, RetryPolicy::default())
            .with_sleeper(move |d| {
                assert_eq!(d, Duration::from_secs(2));
                counter.set(counter.get() + 1);
            });
        (fetcher, sleeps)
    }

    #[test]
    fn success_returns_derived_name() {
        let dir = tempfile::tempdir().unwrap();
        let (mut f, sleeps) = counting_fetcher(ScriptedSource::new(vec![Ok(png_bytes())]));
        let name = f.fetch("https://mitemin.net/x/pic.png", dir.path());
        assert_eq!(name.as_deref(), Some("pic.png"));
        assert!(dir.path().join("pic.png").is_file());
        assert_eq!(sleeps.get(), 0);
    }

    #[test]
    fn three_failures_sleep_twice_and_give_up() {
        let dir = tempfile::tempdir().unwrap();
        let (mut f, sleeps) = counting_fetcher(ScriptedSource::new(vec![Err(500)]));
        assert_eq!(f.fetch("https://mitemin.net/x/pic.png", dir.path()), None);
        assert_eq!(f.source.calls.get(), 3);
        assert_eq!(sleeps.get(), 2);
        assert!(!dir.path().join("pic.png").exists());
    }

    #[test]
    fn recovers_on_third_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(vec![Err(503), Ok(b"junk".to_vec()), Ok(png_bytes())]);
        let (mut f, sleeps) = counting_fetcher(source);
        let name = f.fetch("https://mitemin.net/x/pic.png", dir.path());
        assert_eq!(name.as_deref(), Some("pic.png"));
        assert_eq!(sleeps.get(), 2);
    }

    #[test]
    fn same_url_reuses_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut f, _) = counting_fetcher(ScriptedSource::new(vec![Ok(png_bytes())]));
        let a = f.fetch("https://mitemin.net/x/pic.png", dir.path());
        let b = f.fetch("https://mitemin.net/x/pic.png", dir.path());
        assert_eq!(a, b);
        assert_eq!(f.source.calls.get(), 1);
    }

    #[test]
    fn same_basename_different_url_is_suffixed() {
        let dir = tempfile::tempdir().unwrap();
        let (mut f, _) = counting_fetcher(ScriptedSource::new(vec![Ok(png_bytes())]));
        let a = f.fetch("https://a.mitemin.net/one/pic.png", dir.path());
        let b = f.fetch("https://b.mitemin.net/two/pic.png", dir.path());
        assert_eq!(a.as_deref(), Some("pic.png"));
        assert_eq!(b.as_deref(), Some("pic-1.png"));
        assert!(dir.path().join("pic-1.png").is_file());
    }

    #[test]
    fn existing_file_in_archive_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cover.jpg"), b"original").unwrap();
        let (mut f, _) = counting_fetcher(ScriptedSource::new(vec![Ok(png_bytes())]));
        let name = f.fetch("https://mitemin.net/cover.jpg", dir.path());
        assert_eq!(name.as_deref(), Some("cover-1.jpg"));
        assert_eq!(std::fs::read(dir.path().join("cover.jpg")).unwrap(), b"original");
    }
}
