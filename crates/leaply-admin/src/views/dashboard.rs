use crate::context::AdminContext;
use crate::error::Result;

/// Record counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub universities: usize,
    pub programs: usize,
    pub users: usize,
}

impl DashboardStats {
    /// Load all three lists concurrently through the cache.
    ///
    /// The unfiltered program list is shared with the programs page, so
    /// opening it afterwards is a cache hit.
    pub async fn load(ctx: &AdminContext) -> Result<Self> {
        let (universities, programs, users) =
            tokio::try_join!(ctx.universities(), ctx.programs(None), ctx.users())?;
        Ok(Self {
            universities: universities.len(),
            programs: programs.len(),
            users: users.len(),
        })
    }
}
