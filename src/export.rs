use std::path::Path;

use anyhow::Result;
use rust_xlsxwriter::Workbook;

use crate::extract::PostRecord;

/// Filename the spreadsheet is saved under when no explicit path is given.
pub fn default_filename(blog_id: &str) -> String {
    format!("naver_blog_{blog_id}.xlsx")
}

/// Write the collected posts as a single-sheet spreadsheet: header row from
/// the record field names, one row per post in final order.
pub fn write_xlsx(posts: &[PostRecord], path: &Path) -> Result<()> {
    let Some(first) = posts.first() else {
        anyhow::bail!("nothing to export");
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.serialize_headers(0, 0, first)?;
    for post in posts {
        worksheet.serialize(post)?;
    }

    // Titles and permalinks need the room; dates don't.
    worksheet.set_column_width(0, 48)?;
    worksheet.set_column_width(1, 16)?;
    worksheet.set_column_width(2, 44)?;

    workbook.save(path)?;
    Ok(())
}

// ── Tests ──
