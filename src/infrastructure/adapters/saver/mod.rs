//! File Saver Adapter - 文件系统保存实现

mod fs_file_saver;

pub use fs_file_saver::FsFileSaver;
