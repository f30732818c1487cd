use crate::catalog::model::{CatalogError, ImageId, NewImage};
use async_trait::async_trait;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// 在同一事务中创建图片行和相册关系行，要么都成功要么都不写入
    async fn create_image_in_album(&self, image: &NewImage, album: &str) -> Result<ImageId, CatalogError>;

    /// 逻辑删除：置 del = 1 并移除相册关系，返回受影响的图片数
    async fn soft_delete_images(&self, ids: &[String]) -> Result<u64, CatalogError>;

    /// 按 id 列表批量更新首页显示状态
    async fn update_mainpage(&self, ids: &[String], show_on_mainpage: i16) -> Result<u64, CatalogError>;

    /// 更新单张图片的显示状态
    async fn update_show(&self, id: &str, show: i16) -> Result<(), CatalogError>;

    /// 把图片重新绑定到另一个相册，替换原有关系
    async fn rebind_album(&self, id: &str, album: &str) -> Result<(), CatalogError>;
}
