use crate::error::{Error, Result};
use domain::User;

// 每个请求的调用者身份，显式传给依赖当前用户的操作
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    user_id: Option<i64>,
    is_manager: bool,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            is_manager: false,
        }
    }

    pub fn manager(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            is_manager: true,
        }
    }

    pub fn from_user(user: Option<&User>) -> Self {
        match user {
            Some(u) if u.is_manager => Self::manager(u.id),
            Some(u) => Self::user(u.id),
            None => Self::anonymous(),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn is_manager(&self) -> bool {
        self.is_manager
    }

    pub fn user_id_or_fail(&self) -> Result<i64> {
        self.user_id.ok_or(Error::Unauthorized)
    }

    pub fn manager_id_or_fail(&self) -> Result<i64> {
        let id = self.user_id_or_fail()?;
        if self.is_manager {
            Ok(id)
        } else {
            Err(Error::Forbidden)
        }
    }

    // 作者本人或管理员
    pub fn owner_or_manager_or_fail(&self, owner_id: i64) -> Result<i64> {
        let id = self.user_id_or_fail()?;
        if self.is_manager || id == owner_id {
            Ok(id)
        } else {
            Err(Error::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_viewer_is_rejected() {
        let viewer = Viewer::anonymous();
        assert!(matches!(viewer.user_id_or_fail(), Err(Error::Unauthorized)));
        assert!(matches!(viewer.manager_id_or_fail(), Err(Error::Unauthorized)));
    }

    #[test]
    fn plain_user_is_not_a_manager() {
        let viewer = Viewer::user(3);
        assert_eq!(viewer.user_id_or_fail().unwrap(), 3);
        assert!(matches!(viewer.manager_id_or_fail(), Err(Error::Forbidden)));
        assert_eq!(viewer.owner_or_manager_or_fail(3).unwrap(), 3);
        assert!(matches!(
            viewer.owner_or_manager_or_fail(4),
            Err(Error::Forbidden)
        ));
    }

    #[test]
    fn manager_may_act_on_anything() {
        let viewer = Viewer::manager(1);
        assert_eq!(viewer.manager_id_or_fail().unwrap(), 1);
        assert_eq!(viewer.owner_or_manager_or_fail(99).unwrap(), 1);
    }
}
