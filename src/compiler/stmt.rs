use crate::{
    ast::{
        ast::Stmt,
        statements::{BlockStmt, IfStmt, ReturnStmt, VarDeclStmt},
    },
    errors::errors::GenerationError,
    type_checker::types::Type,
};

use super::{bytecode::Op, compiler::Compiler, expr::gen_expression};

/// Generates a statement. The operand stack depth is the same before and after.
pub fn gen_statement<'a>(compiler: &mut Compiler<'a>, statement: &Stmt) -> Result<(), GenerationError> {
    let depth = compiler.current.depth();

    match statement {
        Stmt::VarDecl(decl) => gen_var_decl(compiler, decl)?,
        Stmt::Return(ret) => gen_return(compiler, ret)?,
        Stmt::Expression(expression) => {
            let type_ = gen_expression(compiler, &expression.expression)?;

            if !type_.is_void() {
                compiler.emit(Op::Pop)?;
            }
        }
        Stmt::If(if_stmt) => gen_if(compiler, if_stmt)?,
        Stmt::Print(print) => {
            let type_ = gen_expression(compiler, &print.value)?;
            compiler.emit(Op::Print(type_))?;
        }
        Stmt::Block(block) => gen_block(compiler, block)?,
    }

    if compiler.current.depth() != depth {
        return Err(GenerationError::StackImbalance {
            unit: compiler.current.name.to_string(),
            expected: depth,
            found: compiler.current.depth(),
        });
    }

    Ok(())
}

/// Generates the statements of a block in the current scope.
pub fn gen_block<'a>(compiler: &mut Compiler<'a>, block: &BlockStmt) -> Result<(), GenerationError> {
    for statement in block.iter() {
        gen_statement(compiler, statement)?;
    }

    Ok(())
}

fn gen_var_decl<'a>(compiler: &mut Compiler<'a>, decl: &VarDeclStmt) -> Result<(), GenerationError> {
    let declared = Type::from(&decl.explicit_type);
    let value_type = gen_expression(compiler, &decl.assigned_value)?;
    compiler.convert(&value_type, &declared)?;

    // The value is generated before the name is bound, so `let x = x` reads the outer `x`
    if compiler.current.declares_globals() {
        let cell = compiler.declare_global(&decl.identifier);
        compiler.emit(Op::StoreGlobal(cell))
    } else {
        let slot = compiler.current.declare_local(&decl.identifier);
        compiler.emit(Op::StoreLocal(slot))
    }
}

fn gen_return<'a>(compiler: &mut Compiler<'a>, ret: &ReturnStmt) -> Result<(), GenerationError> {
    match &ret.value {
        Some(value) => {
            let value_type = gen_expression(compiler, value)?;

            // `return f()` in a void callable: the call leaves nothing to return
            if value_type.is_void() {
                return compiler.emit(Op::ReturnVoid);
            }

            let return_type = compiler.current.return_type.clone();

            compiler.convert(&value_type, &return_type)?;
            compiler.emit(Op::Return)
        }
        None => compiler.emit(Op::ReturnVoid),
    }
}

fn gen_if<'a>(compiler: &mut Compiler<'a>, if_stmt: &IfStmt) -> Result<(), GenerationError> {
    let condition = gen_expression(compiler, &if_stmt.condition)?;
    compiler.convert(&condition, &Type::Bool)?;

    // Branch over the negated condition straight to the else arm or the exit
    let else_label = compiler.current.make_label();
    compiler.emit(Op::Not)?;
    compiler.emit(Op::JumpIf(else_label))?;

    compiler.current.enter_scope();
    gen_block(compiler, &if_stmt.consequent)?;
    compiler.current.exit_scope();

    match &if_stmt.alternate {
        Some(alternate) => {
            let end_label = compiler.current.make_label();
            compiler.emit(Op::Jump(end_label))?;

            compiler.current.place_label(else_label);
            compiler.current.enter_scope();
            gen_block(compiler, alternate)?;
            compiler.current.exit_scope();

            compiler.current.place_label(end_label);
        }
        None => compiler.current.place_label(else_label),
    }

    Ok(())
}
