//! Cross-collection moves
//!
//! Each move removes the entry from its source collection first, then inserts
//! it into the destination. The insert follows the destination's own rules:
//! the log upserts, links and the reading queue ignore URLs they already
//! hold. Nothing is rolled back if the insert is a no-op.

use crate::categories::{self, MY_LINKS};
use crate::remote::RemoteSync;
use crate::selector::Pick;
use crate::session::Session;
use crate::store::InputError;

impl<R: RemoteSync> Session<R> {
    /// Queue a logged article again under the category it was logged with
    pub fn log_to_reading(&mut self, index: usize) -> Result<(), InputError> {
        let entry = self.remove_from_log(index)?;
        let key = categories::key_for_label(&entry.category);
        self.add_to_reading(&entry.url, &entry.title, Some(key));
        Ok(())
    }

    pub fn log_to_links(&mut self, index: usize) -> Result<(), InputError> {
        let entry = self.remove_from_log(index)?;
        self.add_user_link(&entry.url, &entry.title, &entry.notes);
        Ok(())
    }

    pub fn reading_to_log(&mut self, index: usize) -> Result<(), InputError> {
        let entry = self.remove_from_reading(index)?;
        self.log_article(&entry.url, &entry.title, &entry.category_key);
        Ok(())
    }

    pub fn reading_to_links(&mut self, index: usize) -> Result<(), InputError> {
        let entry = self.remove_from_reading(index)?;
        self.add_user_link(&entry.url, &entry.title, &entry.notes);
        Ok(())
    }

    pub fn links_to_reading(&mut self, index: usize) -> Result<(), InputError> {
        let link = self.remove_user_link(index)?;
        self.add_to_reading(&link.url, &link.title, Some(MY_LINKS));
        Ok(())
    }

    pub fn links_to_log(&mut self, index: usize) -> Result<(), InputError> {
        let link = self.remove_user_link(index)?;
        self.log_article(&link.url, &link.title, MY_LINKS);
        Ok(())
    }

    /// Log a picked article, taking it out of the saved links if it came
    /// from there
    pub fn log_pick(&mut self, pick: &Pick) {
        if pick.from_links {
            self.remove_user_link_by_url(&pick.url);
        }
        self.log_article(&pick.url, &pick.title, &pick.category_key);
    }

    /// Queue a picked article, taking it out of the saved links if it came
    /// from there
    pub fn read_pick(&mut self, pick: &Pick) -> bool {
        if pick.from_links {
            self.remove_user_link_by_url(&pick.url);
        }
        self.add_to_reading(&pick.url, &pick.title, Some(&pick.category_key))
    }
}
