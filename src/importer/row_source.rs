// ==========================================
// 分隔文本导入核心 - 行数据源
// ==========================================
// 职责: 按行产出原始单元格字节，并提供当前行号
// 实现: CSV 文件（csv crate，按字节读取，不做解码）/ 内存行
// ==========================================

use crate::domain::record::RawRow;
use crate::importer::error::{ImportError, ImporterResult};
use csv::{ByteRecord, Reader, ReaderBuilder};
use std::collections::VecDeque;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ==========================================
// RowSource Trait
// ==========================================
// 用途: 导入核心消费的行序列
// 实现者: CsvRowSource, MemoryRowSource
pub trait RowSource {
    /// 读取下一行
    ///
    /// # 返回
    /// - Some(Ok(RawRow)): 下一行
    /// - Some(Err): 读取失败（不可恢复）
    /// - None: 已读完
    fn next_row(&mut self) -> Option<ImporterResult<RawRow>>;

    /// 最近一次返回行的行号（1 起，未读取时为 0）
    fn row_number(&self) -> usize;
}

impl<S: RowSource + ?Sized> RowSource for &mut S {
    fn next_row(&mut self) -> Option<ImporterResult<RawRow>> {
        (**self).next_row()
    }

    fn row_number(&self) -> usize {
        (**self).row_number()
    }
}

// ==========================================
// CSV 行数据源
// ==========================================
pub struct CsvRowSource<R: Read> {
    reader: Reader<R>,
    record: ByteRecord,
    row_number: usize,
}

impl CsvRowSource<File> {
    /// 打开 CSV 文件
    ///
    /// # 参数
    /// - path: 文件路径
    /// - delimiter: 分隔符字节
    pub fn open<P: AsRef<Path>>(path: P, delimiter: u8) -> ImporterResult<Self> {
        let path = path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        Ok(Self::from_reader(file, delimiter))
    }
}

impl<R: Read> CsvRowSource<R> {
    pub fn from_reader(reader: R, delimiter: u8) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致（由字段映射判定）
            .delimiter(delimiter)
            .from_reader(reader);

        Self {
            reader,
            record: ByteRecord::new(),
            row_number: 0,
        }
    }
}

impl<R: Read> RowSource for CsvRowSource<R> {
    fn next_row(&mut self) -> Option<ImporterResult<RawRow>> {
        match self.reader.read_byte_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                self.row_number += 1;
                let mut row: RawRow = self.record.iter().map(<[u8]>::to_vec).collect();

                // 去除首行首列的 UTF-8 BOM
                if self.row_number == 1 {
                    if let Some(first) = row.first_mut() {
                        if first.starts_with(UTF8_BOM) {
                            first.drain(..UTF8_BOM.len());
                        }
                    }
                }

                Some(Ok(row))
            }
            Err(e) => Some(Err(e.into())),
        }
    }

    fn row_number(&self) -> usize {
        self.row_number
    }
}

// ==========================================
// 内存行数据源
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    rows: VecDeque<RawRow>,
    row_number: usize,
}

impl MemoryRowSource {
    /// 由原始字节行创建
    pub fn from_raw_rows(rows: Vec<RawRow>) -> Self {
        Self {
            rows: rows.into(),
            row_number: 0,
        }
    }

    /// 由字符串行创建（以 UTF-8 字节存放）
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_raw_rows(
            rows.into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|cell| cell.as_ref().as_bytes().to_vec())
                        .collect()
                })
                .collect(),
        )
    }
}

impl RowSource for MemoryRowSource {
    fn next_row(&mut self) -> Option<ImporterResult<RawRow>> {
        let row = self.rows.pop_front()?;
        self.row_number += 1;
        Some(Ok(row))
    }

    fn row_number(&self) -> usize {
        self.row_number
    }
}
